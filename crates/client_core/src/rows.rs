//! Display rows for each entity kind and their normalization from raw wire
//! records.
//!
//! Raw payloads are decoded and normalized once, when they arrive. Everything
//! downstream (filtering, sorting, rendering) only ever sees these rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use shared::{
    domain::{EntityId, EntityKind},
    protocol::{
        NumberOrText, RawCustomer, RawLiveEvent, RawOrder, RawPayment, RawProduct, WireRecord,
    },
};

use crate::error::ClientError;

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
    /// Numeric columns sort by the parsed value of their cell text.
    pub numeric: bool,
}

const fn text(key: &'static str, label: &'static str) -> Column {
    Column {
        key,
        label,
        numeric: false,
    }
}

const fn number(key: &'static str, label: &'static str) -> Column {
    Column {
        key,
        label,
        numeric: true,
    }
}

/// A normalized list row for one entity kind.
pub trait ListRow: Clone + Send + Sync + 'static {
    type Raw: WireRecord + Send + 'static;

    const KIND: EntityKind;
    const COLUMNS: &'static [Column];

    /// `index` is the row's position in the response, used to synthesize a
    /// local id when the backend omits one.
    fn from_raw(raw: Self::Raw, index: usize) -> Self;

    fn id(&self) -> &EntityId;

    /// Fields the free-text search looks at.
    fn search_fields(&self) -> Vec<&str>;

    /// `filter` is a lower-case tab key other than `all`.
    fn matches_filter(&self, filter: &str) -> bool;

    fn cell(&self, key: &str) -> String;

    fn column(key: &str) -> Option<&'static Column> {
        Self::COLUMNS.iter().find(|column| column.key == key)
    }
}

/// Decodes raw JSON records into rows. Unusable fields fall back to
/// placeholders; only a record that is not a JSON object fails the batch.
pub fn decode_rows<R: ListRow>(values: Vec<serde_json::Value>) -> Result<Vec<R>, ClientError> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let raw = R::Raw::from_json(value)?;
            Ok(R::from_raw(raw, index))
        })
        .collect()
}

/// Lower-cases a status and folds spaces and dashes to underscores so that
/// `"Out of stock"`, `"out-of-stock"` and `"OUT_OF_STOCK"` compare equal.
pub fn status_key(status: &str) -> String {
    status
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

fn text_or_na(value: Option<String>) -> String {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn resolve_id(id: Option<EntityId>, object_id: Option<EntityId>, index: usize) -> EntityId {
    id.or(object_id)
        .filter(|id| !id.as_str().trim().is_empty())
        .unwrap_or_else(|| EntityId(format!("local-{index}")))
}

pub fn format_amount(value: f64) -> String {
    if value < 0.0 {
        format!("-€{:.2}", value.abs())
    } else {
        format!("€{value:.2}")
    }
}

fn amount(value: Option<&NumberOrText>) -> String {
    format_amount(value.and_then(NumberOrText::as_f64).unwrap_or(0.0))
}

fn count(value: Option<&NumberOrText>) -> u64 {
    value
        .and_then(NumberOrText::as_f64)
        .filter(|value| value.is_finite() && *value > 0.0)
        .map(|value| value.round() as u64)
        .unwrap_or(0)
}

/// `YYYY-MM-DD` for RFC 3339, ISO datetimes and plain dates; anything else is
/// kept verbatim.
pub fn normalize_date(value: Option<String>) -> String {
    let Some(raw) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return NOT_AVAILABLE.to_string();
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return parsed.format("%Y-%m-%d").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%Y-%m-%d").to_string();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return parsed.format("%Y-%m-%d").to_string();
    }
    raw
}

/// Like [`normalize_date`] but keeps the time of day: `YYYY-MM-DD HH:MM`.
pub fn normalize_schedule(value: Option<String>) -> String {
    let Some(raw) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return NOT_AVAILABLE.to_string();
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%Y-%m-%d %H:%M").to_string();
    }
    raw
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRow {
    pub id: EntityId,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub status: String,
    pub price: String,
    pub stock: u64,
}

impl ListRow for ProductRow {
    type Raw = RawProduct;

    const KIND: EntityKind = EntityKind::Product;
    const COLUMNS: &'static [Column] = &[
        text("name", "Name"),
        text("sku", "SKU"),
        text("category", "Category"),
        number("price", "Price"),
        number("stock", "Stock"),
        text("status", "Status"),
    ];

    fn from_raw(raw: RawProduct, index: usize) -> Self {
        Self {
            id: resolve_id(raw.id, raw.object_id, index),
            name: text_or_na(raw.name),
            sku: text_or_na(raw.sku),
            category: text_or_na(raw.category),
            status: text_or_na(raw.status),
            price: amount(raw.price.as_ref()),
            stock: count(raw.stock.as_ref()),
        }
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.sku.as_str(), self.category.as_str()]
    }

    fn matches_filter(&self, filter: &str) -> bool {
        match filter {
            "out_of_stock" => self.stock == 0,
            other => status_key(&self.status) == other,
        }
    }

    fn cell(&self, key: &str) -> String {
        match key {
            "name" => self.name.clone(),
            "sku" => self.sku.clone(),
            "category" => self.category.clone(),
            "price" => self.price.clone(),
            "stock" => self.stock.to_string(),
            "status" => self.status.clone(),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRow {
    pub id: EntityId,
    pub order_number: String,
    pub customer: String,
    pub date: String,
    pub total: String,
    pub payment: String,
    pub shipping: String,
}

impl ListRow for OrderRow {
    type Raw = RawOrder;

    const KIND: EntityKind = EntityKind::Order;
    const COLUMNS: &'static [Column] = &[
        text("order_number", "Order"),
        text("customer", "Customer"),
        text("date", "Date"),
        number("total", "Total"),
        text("payment", "Payment"),
        text("shipping", "Shipping"),
    ];

    fn from_raw(raw: RawOrder, index: usize) -> Self {
        let id = resolve_id(raw.id, raw.object_id, index);
        let order_number = raw
            .order_number
            .filter(|number| !number.trim().is_empty())
            .unwrap_or_else(|| id.to_string());
        Self {
            id,
            order_number,
            customer: text_or_na(raw.customer_name),
            date: normalize_date(raw.created_at),
            total: amount(raw.total.as_ref()),
            payment: text_or_na(raw.payment_status),
            shipping: text_or_na(raw.shipping_status),
        }
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.order_number.as_str(), self.customer.as_str(), self.id.as_str()]
    }

    fn matches_filter(&self, filter: &str) -> bool {
        let payment = status_key(&self.payment);
        let shipping = status_key(&self.shipping);
        match filter {
            "active" => payment == "pending" || shipping == "shipped",
            "completed" => shipping == "delivered",
            "cancelled" => shipping == "cancelled" || payment == "failed",
            other => payment == other || shipping == other,
        }
    }

    fn cell(&self, key: &str) -> String {
        match key {
            "order_number" => self.order_number.clone(),
            "customer" => self.customer.clone(),
            "date" => self.date.clone(),
            "total" => self.total.clone(),
            "payment" => self.payment.clone(),
            "shipping" => self.shipping.clone(),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRow {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub orders: u64,
    pub total_spent: String,
    pub status: String,
}

impl ListRow for CustomerRow {
    type Raw = RawCustomer;

    const KIND: EntityKind = EntityKind::Customer;
    const COLUMNS: &'static [Column] = &[
        text("name", "Name"),
        text("email", "Email"),
        text("phone", "Phone"),
        number("orders", "Orders"),
        number("total_spent", "Total spent"),
        text("status", "Status"),
    ];

    fn from_raw(raw: RawCustomer, index: usize) -> Self {
        Self {
            id: resolve_id(raw.id, raw.object_id, index),
            name: text_or_na(raw.name),
            email: text_or_na(raw.email),
            phone: text_or_na(raw.phone),
            orders: count(raw.orders_count.as_ref()),
            total_spent: amount(raw.total_spent.as_ref()),
            status: text_or_na(raw.status),
        }
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.phone.as_str()]
    }

    fn matches_filter(&self, filter: &str) -> bool {
        status_key(&self.status) == filter
    }

    fn cell(&self, key: &str) -> String {
        match key {
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            "phone" => self.phone.clone(),
            "orders" => self.orders.to_string(),
            "total_spent" => self.total_spent.clone(),
            "status" => self.status.clone(),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRow {
    pub id: EntityId,
    pub order_id: String,
    pub customer: String,
    pub method: String,
    pub amount: String,
    pub status: String,
    pub date: String,
}

impl ListRow for PaymentRow {
    type Raw = RawPayment;

    const KIND: EntityKind = EntityKind::Payment;
    const COLUMNS: &'static [Column] = &[
        text("id", "Payment"),
        text("order_id", "Order"),
        text("customer", "Customer"),
        text("method", "Method"),
        number("amount", "Amount"),
        text("status", "Status"),
        text("date", "Date"),
    ];

    fn from_raw(raw: RawPayment, index: usize) -> Self {
        Self {
            id: resolve_id(raw.id, raw.object_id, index),
            order_id: text_or_na(raw.order_id.map(|id| id.0)),
            customer: text_or_na(raw.customer_name),
            method: text_or_na(raw.method),
            amount: amount(raw.amount.as_ref()),
            status: text_or_na(raw.status),
            date: normalize_date(raw.created_at),
        }
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.id.as_str(),
            self.order_id.as_str(),
            self.customer.as_str(),
            self.method.as_str(),
        ]
    }

    fn matches_filter(&self, filter: &str) -> bool {
        status_key(&self.status) == filter
    }

    fn cell(&self, key: &str) -> String {
        match key {
            "id" => self.id.to_string(),
            "order_id" => self.order_id.clone(),
            "customer" => self.customer.clone(),
            "method" => self.method.clone(),
            "amount" => self.amount.clone(),
            "status" => self.status.clone(),
            "date" => self.date.clone(),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveEventRow {
    pub id: EntityId,
    pub title: String,
    pub host: String,
    pub scheduled_at: String,
    pub status: String,
    pub viewers: u64,
    pub revenue: String,
}

impl ListRow for LiveEventRow {
    type Raw = RawLiveEvent;

    const KIND: EntityKind = EntityKind::LiveEvent;
    const COLUMNS: &'static [Column] = &[
        text("title", "Title"),
        text("host", "Host"),
        text("scheduled_at", "Scheduled"),
        number("viewers", "Viewers"),
        number("revenue", "Revenue"),
        text("status", "Status"),
    ];

    fn from_raw(raw: RawLiveEvent, index: usize) -> Self {
        Self {
            id: resolve_id(raw.id, raw.object_id, index),
            title: text_or_na(raw.title),
            host: text_or_na(raw.host),
            scheduled_at: normalize_schedule(raw.scheduled_at),
            status: text_or_na(raw.status),
            viewers: count(raw.viewers.as_ref()),
            revenue: amount(raw.revenue.as_ref()),
        }
    }

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.host.as_str()]
    }

    fn matches_filter(&self, filter: &str) -> bool {
        status_key(&self.status) == filter
    }

    fn cell(&self, key: &str) -> String {
        match key {
            "title" => self.title.clone(),
            "host" => self.host.clone(),
            "scheduled_at" => self.scheduled_at.clone(),
            "viewers" => self.viewers.to_string(),
            "revenue" => self.revenue.clone(),
            "status" => self.status.clone(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
#[path = "tests/rows_tests.rs"]
mod tests;
