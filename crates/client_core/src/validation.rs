//! Field-level checks for the create/edit forms. A draft that fails here is
//! never sent.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde_json::{json, Value};

use crate::rows::{CustomerRow, LiveEventRow, NOT_AVAILABLE};

pub const SCHEDULE_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const PRODUCT_STATUSES: &[&str] = &["active", "draft"];
pub const CUSTOMER_STATUSES: &[&str] = &["active", "inactive"];

/// Per-field messages in the order the checks ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(&'static str, String)>,
}

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.entries.push((field, message.into()));
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries
            .iter()
            .map(|(name, message)| (*name, message.as_str()))
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.entries {
            self.push(field, message);
        }
    }

    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (field, message)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

fn required(errors: &mut FieldErrors, field: &'static str, value: &str, label: &str) -> bool {
    if value.trim().is_empty() {
        errors.push(field, format!("{label} is required."));
        false
    } else {
        true
    }
}

fn one_of(errors: &mut FieldErrors, field: &'static str, value: &str, allowed: &[&str]) {
    let value = value.trim().to_lowercase();
    if !allowed.contains(&value.as_str()) {
        errors.push(field, format!("Must be one of: {}.", allowed.join(", ")));
    }
}

pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

pub fn is_valid_sku(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && value.len() <= 64
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Digits plus the usual separators, with at least seven digits.
pub fn is_valid_phone(value: &str) -> bool {
    let value = value.trim();
    let digits = value.chars().filter(char::is_ascii_digit).count();
    digits >= 7
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.'))
}

pub fn parse_price(value: &str) -> Result<f64, &'static str> {
    let cleaned: String = value
        .trim()
        .trim_start_matches('€')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    match cleaned.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        Ok(_) => Err("Price must be zero or more."),
        Err(_) => Err("Price must be a number."),
    }
}

pub fn parse_stock(value: &str) -> Result<u64, &'static str> {
    let value = value.trim();
    if value.starts_with('-') {
        return Err("Stock must be zero or more.");
    }
    value
        .parse::<u64>()
        .map_err(|_| "Stock must be a whole number.")
}

/// Accepts RFC 3339 or `YYYY-MM-DD HH:MM` and returns the value the backend
/// stores (`YYYY-MM-DDTHH:MM:SS`, offset kept when given).
pub fn parse_schedule(value: &str) -> Option<String> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.to_rfc3339());
    }
    NaiveDateTime::parse_from_str(value, SCHEDULE_FORMAT)
        .ok()
        .map(|parsed| parsed.format("%Y-%m-%dT%H:%M:%S").to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub status: String,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            sku: String::new(),
            category: String::new(),
            description: String::new(),
            price: String::new(),
            stock: "0".to_string(),
            status: "draft".to_string(),
        }
    }
}

impl ProductDraft {
    pub fn check_basics(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        required(&mut errors, "name", &self.name, "Name");
        if required(&mut errors, "sku", &self.sku, "SKU") && !is_valid_sku(&self.sku) {
            errors.push(
                "sku",
                "SKU may only contain letters, digits, dashes and underscores.",
            );
        }
        required(&mut errors, "category", &self.category, "Category");
        errors
    }

    pub fn check_pricing(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        if required(&mut errors, "price", &self.price, "Price") {
            if let Err(message) = parse_price(&self.price) {
                errors.push("price", message);
            }
        }
        errors
    }

    pub fn check_inventory(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        if required(&mut errors, "stock", &self.stock, "Stock") {
            if let Err(message) = parse_stock(&self.stock) {
                errors.push("stock", message);
            }
        }
        one_of(&mut errors, "status", &self.status, PRODUCT_STATUSES);
        errors
    }

    /// Runs every check and builds the request body.
    pub fn validate(&self) -> Result<Value, FieldErrors> {
        let mut errors = self.check_basics();
        errors.merge(self.check_pricing());
        errors.merge(self.check_inventory());
        if !errors.is_empty() {
            return Err(errors);
        }

        let price = parse_price(&self.price).unwrap_or_default();
        let stock = parse_stock(&self.stock).unwrap_or_default();
        Ok(json!({
            "name": self.name.trim(),
            "sku": self.sku.trim(),
            "category": self.category.trim(),
            "description": self.description.trim(),
            "price": price,
            "stock": stock,
            "status": self.status.trim().to_lowercase(),
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: String,
}

impl Default for CustomerDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            status: "active".to_string(),
        }
    }
}

fn editable(value: &str) -> String {
    if value == NOT_AVAILABLE {
        String::new()
    } else {
        value.to_string()
    }
}

impl CustomerDraft {
    pub fn from_row(row: &CustomerRow) -> Self {
        Self {
            name: editable(&row.name),
            email: editable(&row.email),
            phone: editable(&row.phone),
            status: row.status.to_lowercase(),
        }
    }

    pub fn validate(&self) -> Result<Value, FieldErrors> {
        let mut errors = FieldErrors::default();
        required(&mut errors, "name", &self.name, "Name");
        if required(&mut errors, "email", &self.email, "Email") && !is_valid_email(&self.email)
        {
            errors.push("email", "Enter a valid email address.");
        }
        if !self.phone.trim().is_empty() && !is_valid_phone(&self.phone) {
            errors.push("phone", "Enter a valid phone number.");
        }
        one_of(&mut errors, "status", &self.status, CUSTOMER_STATUSES);

        errors.into_result(json!({
            "name": self.name.trim(),
            "email": self.email.trim().to_lowercase(),
            "phone": self.phone.trim(),
            "status": self.status.trim().to_lowercase(),
        }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveEventDraft {
    pub title: String,
    pub host: String,
    pub scheduled_at: String,
    pub description: String,
}

impl LiveEventDraft {
    pub fn from_row(row: &LiveEventRow) -> Self {
        Self {
            title: editable(&row.title),
            host: editable(&row.host),
            scheduled_at: editable(&row.scheduled_at),
            description: String::new(),
        }
    }

    pub fn validate(&self) -> Result<Value, FieldErrors> {
        let mut errors = FieldErrors::default();
        required(&mut errors, "title", &self.title, "Title");
        required(&mut errors, "host", &self.host, "Host");
        let schedule = if required(&mut errors, "scheduled_at", &self.scheduled_at, "Schedule") {
            let parsed = parse_schedule(&self.scheduled_at);
            if parsed.is_none() {
                errors.push("scheduled_at", "Use YYYY-MM-DD HH:MM.");
            }
            parsed
        } else {
            None
        };

        errors.into_result(json!({
            "title": self.title.trim(),
            "host": self.host.trim(),
            "scheduledAt": schedule.unwrap_or_default(),
            "description": self.description.trim(),
        }))
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
