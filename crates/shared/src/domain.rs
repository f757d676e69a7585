use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Server-assigned record identifier. The backend is inconsistent about
/// sending ids as strings or numbers, so both are accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Text(text) => Self(text),
            WireId::Signed(value) => Self(value.to_string()),
            WireId::Unsigned(value) => Self(value.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Product,
    Order,
    Customer,
    Payment,
    LiveEvent,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Product,
        EntityKind::Order,
        EntityKind::Customer,
        EntityKind::Payment,
        EntityKind::LiveEvent,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::Order => "Order",
            Self::Customer => "Customer",
            Self::Payment => "Payment",
            Self::LiveEvent => "Live event",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Self::Product => "products",
            Self::Order => "orders",
            Self::Customer => "customers",
            Self::Payment => "payments",
            Self::LiveEvent => "live events",
        }
    }

    /// Collection path; detail, bulk-delete, export and import hang off it.
    pub fn list_path(self) -> &'static str {
        match self {
            Self::Product => "/api/products",
            Self::Order => "/api/orders",
            Self::Customer => "/api/customers",
            Self::Payment => "/api/payments",
            Self::LiveEvent => "/api/live-events",
        }
    }

    pub fn page_size(self) -> usize {
        match self {
            Self::Product => 10,
            Self::Order => 8,
            Self::Customer => 10,
            Self::Payment => 7,
            Self::LiveEvent => 9,
        }
    }

    pub fn bulk_delete_key(self) -> &'static str {
        match self {
            Self::Product => "product_ids",
            Self::Order => "order_ids",
            Self::Customer => "customer_ids",
            Self::Payment => "payment_ids",
            Self::LiveEvent => "event_ids",
        }
    }

    pub fn export_key(self) -> &'static str {
        match self {
            Self::Product => "productIds",
            Self::Order => "orderIds",
            Self::Customer => "customerIds",
            Self::Payment => "paymentIds",
            Self::LiveEvent => "eventIds",
        }
    }

    /// Filter tabs offered for this kind. The first entry is always the
    /// `all` sentinel.
    pub fn filters(self) -> &'static [&'static str] {
        match self {
            Self::Product => &["all", "active", "draft", "out_of_stock"],
            Self::Order => &["all", "active", "completed", "cancelled"],
            Self::Customer => &["all", "active", "inactive"],
            Self::Payment => &["all", "paid", "pending", "failed", "refunded"],
            Self::LiveEvent => &["all", "scheduled", "live", "ended"],
        }
    }

    pub fn export_file_name(self) -> String {
        format!("{}.xlsx", self.plural().replace(' ', "_"))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entity kind '{0}' (expected products, orders, customers, payments or live-events)")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "product" | "products" => Ok(Self::Product),
            "order" | "orders" => Ok(Self::Order),
            "customer" | "customers" => Ok(Self::Customer),
            "payment" | "payments" => Ok(Self::Payment),
            "live-event" | "live-events" | "event" | "events" | "live" => Ok(Self::LiveEvent),
            _ => Err(UnknownEntityKind(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}
