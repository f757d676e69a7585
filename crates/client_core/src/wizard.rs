//! Multi-step "Add product" form.

use serde_json::Value;

use crate::validation::{FieldErrors, ProductDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Basics,
    Pricing,
    Inventory,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Basics,
        WizardStep::Pricing,
        WizardStep::Inventory,
        WizardStep::Review,
    ];

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Basics => "Basics",
            WizardStep::Pricing => "Pricing",
            WizardStep::Inventory => "Inventory",
            WizardStep::Review => "Review",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).map(|index| Self::ALL[index])
    }
}

#[derive(Debug, Clone)]
pub struct ProductWizard {
    pub draft: ProductDraft,
    step: WizardStep,
    errors: FieldErrors,
}

impl Default for ProductWizard {
    fn default() -> Self {
        Self::new(ProductDraft::default())
    }
}

impl ProductWizard {
    pub fn new(draft: ProductDraft) -> Self {
        Self {
            draft,
            step: WizardStep::Basics,
            errors: FieldErrors::default(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    fn check_step(&self, step: WizardStep) -> FieldErrors {
        match step {
            WizardStep::Basics => self.draft.check_basics(),
            WizardStep::Pricing => self.draft.check_pricing(),
            WizardStep::Inventory => self.draft.check_inventory(),
            WizardStep::Review => FieldErrors::default(),
        }
    }

    /// Advances when the current step's fields are valid. Returns whether the
    /// step changed.
    pub fn next(&mut self) -> bool {
        self.errors = self.check_step(self.step);
        if !self.errors.is_empty() {
            return false;
        }
        match self.step.next() {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    pub fn back(&mut self) -> bool {
        self.errors = FieldErrors::default();
        match self.step.previous() {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    /// Produces the create body. Only allowed from the review step; on
    /// failure the wizard jumps back to the first step with an error.
    pub fn submit(&mut self) -> Result<Value, FieldErrors> {
        if self.step != WizardStep::Review {
            let mut errors = FieldErrors::default();
            errors.push("step", "Finish every step before submitting.");
            return Err(errors);
        }
        match self.draft.validate() {
            Ok(body) => {
                self.errors = FieldErrors::default();
                Ok(body)
            }
            Err(errors) => {
                self.step = WizardStep::ALL
                    .into_iter()
                    .find(|step| !self.check_step(*step).is_empty())
                    .unwrap_or(WizardStep::Basics);
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
