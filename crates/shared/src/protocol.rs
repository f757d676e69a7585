use serde::{
    de::DeserializeOwned, ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::{Map, Value};

use crate::domain::{EntityId, EntityKind};

/// A numeric field the backend sends either as a JSON number or as display
/// text (`"€12.50"`, `"1,200"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => parse_amount(text),
        }
    }
}

/// Parses a display amount such as `"€12.50"`, `"$1,234.00"`, `"€12,50"` or
/// `"-3"`.
///
/// Currency symbols and whitespace are ignored. When both `.` and `,` appear
/// the later one is the decimal mark; a lone `,` is a decimal mark only when
/// one or two digits follow it. Returns `None` when no digits remain.
pub fn parse_amount(text: &str) -> Option<f64> {
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if !kept.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let decimal_mark = match (kept.rfind('.'), kept.rfind(',')) {
        (Some(dot), Some(comma)) => Some(if comma > dot { ',' } else { '.' }),
        (None, Some(comma)) => matches!(kept.len() - comma - 1, 1 | 2).then_some(','),
        (Some(_), None) => Some('.'),
        (None, None) => None,
    };
    let normalized: String = kept
        .chars()
        .filter_map(|c| match c {
            '.' | ',' if Some(c) == decimal_mark => Some('.'),
            '.' | ',' => None,
            other => Some(other),
        })
        .collect();
    normalized.parse::<f64>().ok()
}

/// Canonical field names of a wire record, each with the alternate keys the
/// backend has used for it, in order of preference.
pub type KeyAliases = &'static [(&'static str, &'static [&'static str])];

/// A raw list record. Decoding folds alternate keys onto their canonical name
/// first, so a record carrying both `createdAt` and `date` still decodes.
pub trait WireRecord: DeserializeOwned {
    const ALIASES: KeyAliases;

    fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Object(map) => {
                serde_json::from_value(Value::Object(canonical_keys(map, Self::ALIASES)))
            }
            other => serde_json::from_value(other),
        }
    }
}

/// The canonical key wins over its aliases; among aliases the first non-null
/// one is kept and the rest are dropped.
pub fn canonical_keys(mut map: Map<String, Value>, aliases: KeyAliases) -> Map<String, Value> {
    for (canonical, alternates) in aliases {
        let mut chosen = None;
        for key in std::iter::once(canonical).chain(alternates.iter()) {
            if let Some(value) = map.remove(*key) {
                if chosen.is_none() && !value.is_null() {
                    chosen = Some(value);
                }
            }
        }
        if let Some(value) = chosen {
            map.insert(canonical.to_string(), value);
        }
    }
    map
}

/// Text that may arrive as a string, a number, or a populated object with a
/// `name`. Anything else reads as missing.
fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_of(&Value::deserialize(deserializer)?))
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Object(map) => ["name", "fullName", "title"]
            .iter()
            .find_map(|key| map.get(*key).and_then(text_of)),
        _ => None,
    }
}

fn loose_number<'de, D>(deserializer: D) -> Result<Option<NumberOrText>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64().map(NumberOrText::Number),
        Value::String(text) => Some(NumberOrText::Text(text)),
        _ => None,
    })
}

/// Ids may be populated references (`{"_id": ...}`).
fn loose_id<'de, D>(deserializer: D) -> Result<Option<EntityId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(id_of(&Value::deserialize(deserializer)?))
}

fn id_of(value: &Value) -> Option<EntityId> {
    match value {
        Value::String(text) => Some(EntityId(text.clone())),
        Value::Number(number) => Some(EntityId(number.to_string())),
        Value::Object(map) => ["_id", "id", "$oid"]
            .iter()
            .find_map(|key| map.get(*key).and_then(id_of)),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProduct {
    #[serde(default, deserialize_with = "loose_id")]
    pub id: Option<EntityId>,
    #[serde(
        default,
        rename = "_id",
        deserialize_with = "loose_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub object_id: Option<EntityId>,
    #[serde(default, deserialize_with = "loose_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "loose_number")]
    pub price: Option<NumberOrText>,
    #[serde(default, deserialize_with = "loose_number")]
    pub stock: Option<NumberOrText>,
}

impl WireRecord for RawProduct {
    const ALIASES: KeyAliases = &[
        ("name", &["productName", "product_name"]),
        ("stock", &["quantity", "inventory"]),
    ];
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOrder {
    #[serde(default, deserialize_with = "loose_id")]
    pub id: Option<EntityId>,
    #[serde(
        default,
        rename = "_id",
        deserialize_with = "loose_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub object_id: Option<EntityId>,
    #[serde(default, deserialize_with = "loose_text")]
    pub order_number: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "loose_number")]
    pub total: Option<NumberOrText>,
    #[serde(default, deserialize_with = "loose_text")]
    pub payment_status: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub shipping_status: Option<String>,
}

impl WireRecord for RawOrder {
    const ALIASES: KeyAliases = &[
        ("order_number", &["orderNumber"]),
        ("customer_name", &["customerName", "customer"]),
        ("created_at", &["createdAt", "date"]),
        ("total", &["totalAmount", "total_amount"]),
        ("payment_status", &["paymentStatus", "payment"]),
        ("shipping_status", &["shippingStatus", "shipping"]),
    ];
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCustomer {
    #[serde(default, deserialize_with = "loose_id")]
    pub id: Option<EntityId>,
    #[serde(
        default,
        rename = "_id",
        deserialize_with = "loose_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub object_id: Option<EntityId>,
    #[serde(default, deserialize_with = "loose_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "loose_number")]
    pub orders_count: Option<NumberOrText>,
    #[serde(default, deserialize_with = "loose_number")]
    pub total_spent: Option<NumberOrText>,
    #[serde(default, deserialize_with = "loose_text")]
    pub status: Option<String>,
}

impl WireRecord for RawCustomer {
    const ALIASES: KeyAliases = &[
        ("name", &["fullName", "full_name"]),
        ("phone", &["phoneNumber", "phone_number"]),
        ("orders_count", &["ordersCount", "orders"]),
        ("total_spent", &["totalSpent"]),
    ];
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPayment {
    #[serde(default, deserialize_with = "loose_id")]
    pub id: Option<EntityId>,
    #[serde(
        default,
        rename = "_id",
        deserialize_with = "loose_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub object_id: Option<EntityId>,
    #[serde(default, deserialize_with = "loose_id")]
    pub order_id: Option<EntityId>,
    #[serde(default, deserialize_with = "loose_text")]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "loose_number")]
    pub amount: Option<NumberOrText>,
    #[serde(default, deserialize_with = "loose_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub created_at: Option<String>,
}

impl WireRecord for RawPayment {
    const ALIASES: KeyAliases = &[
        ("order_id", &["orderId"]),
        ("customer_name", &["customerName", "customer"]),
        ("method", &["paymentMethod", "payment_method"]),
        ("created_at", &["createdAt", "date"]),
    ];
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLiveEvent {
    #[serde(default, deserialize_with = "loose_id")]
    pub id: Option<EntityId>,
    #[serde(
        default,
        rename = "_id",
        deserialize_with = "loose_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub object_id: Option<EntityId>,
    #[serde(default, deserialize_with = "loose_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub host: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub scheduled_at: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "loose_number")]
    pub viewers: Option<NumberOrText>,
    #[serde(default, deserialize_with = "loose_number")]
    pub revenue: Option<NumberOrText>,
}

impl WireRecord for RawLiveEvent {
    const ALIASES: KeyAliases = &[
        ("title", &["name"]),
        ("host", &["hostName", "host_name"]),
        ("scheduled_at", &["scheduledAt", "start_time", "startTime"]),
        ("viewers", &["viewerCount", "viewer_count"]),
        ("revenue", &["sales", "totalSales"]),
    ];
}

/// List responses arrive wrapped under `data`, under `orders`, or bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Data { data: Vec<T> },
    Orders { orders: Vec<T> },
    Bare(Vec<T>),
}

impl<T> ListPayload<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Data { data } => data,
            Self::Orders { orders } => orders,
            Self::Bare(items) => items,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DetailPayload {
    Wrapped { data: serde_json::Value },
    Bare(serde_json::Value),
}

impl DetailPayload {
    pub fn into_value(self) -> serde_json::Value {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(value) => value,
        }
    }
}

fn default_success() -> bool {
    true
}

/// Result of create/update/delete. A 2xx body without a `success` flag counts
/// as success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of bulk-delete and export requests. The id list key differs per
/// entity kind (`product_ids`, `orderIds`, ...).
#[derive(Debug, Clone)]
pub struct IdListBody {
    pub key: &'static str,
    pub ids: Vec<EntityId>,
}

impl IdListBody {
    pub fn bulk_delete(kind: EntityKind, ids: Vec<EntityId>) -> Self {
        Self {
            key: kind.bulk_delete_key(),
            ids,
        }
    }

    pub fn export(kind: EntityKind, ids: Vec<EntityId>) -> Self {
        Self {
            key: kind.export_key(),
            ids,
        }
    }
}

impl Serialize for IdListBody {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, &self.ids)?;
        map.end()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, alias = "failedIds", skip_serializing_if = "Vec::is_empty")]
    pub failed_ids: Vec<EntityId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub successful: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub duplicates: u64,
}

/// One rejected or duplicate spreadsheet row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportIssue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<u64>,
    #[serde(default, alias = "identifier", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, alias = "error", skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ImportIssue {
    pub fn describe(&self) -> String {
        let location = match (self.row, self.key.as_deref()) {
            (Some(row), Some(key)) => format!("row {row} ({key})"),
            (Some(row), None) => format!("row {row}"),
            (None, Some(key)) => key.to_string(),
            (None, None) => "unknown row".to_string(),
        };
        match self.reason.as_deref() {
            Some(reason) => format!("{location}: {reason}"),
            None => location,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportDetails {
    #[serde(default)]
    pub failed: Vec<ImportIssue>,
    #[serde(default)]
    pub duplicates: Vec<ImportIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub summary: ImportSummary,
    #[serde(default)]
    pub details: ImportDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_currency_prefixed_amounts() {
        assert_eq!(parse_amount("€12.50"), Some(12.50));
        assert_eq!(parse_amount("$1,234.00"), Some(1234.0));
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount("1,200"), Some(1200.0));
        assert_eq!(NumberOrText::Number(3.0).as_f64(), Some(3.0));
    }

    #[test]
    fn trailing_comma_cents_are_decimals() {
        assert_eq!(parse_amount("€12,50"), Some(12.50));
        assert_eq!(parse_amount("€12,5"), Some(12.5));
        assert_eq!(parse_amount("1.234,56 €"), Some(1234.56));
        assert_eq!(parse_amount("-0,99"), Some(-0.99));
    }

    #[test]
    fn alias_keys_fold_onto_the_canonical_name() {
        let order = RawOrder::from_json(serde_json::json!({
            "_id": "o1",
            "date": "2024-01-02",
            "createdAt": "2024-01-01T00:00:00Z",
            "payment": "Paid",
            "paymentStatus": "Pending",
        }))
        .expect("order");
        assert_eq!(order.created_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(order.payment_status.as_deref(), Some("Pending"));

        let product = RawProduct::from_json(serde_json::json!({
            "stock": null,
            "quantity": 4,
            "inventory": 9,
        }))
        .expect("product");
        assert_eq!(product.stock, Some(NumberOrText::Number(4.0)));
    }

    #[test]
    fn populated_references_read_their_name_and_id() {
        let payment = RawPayment::from_json(serde_json::json!({
            "id": 7,
            "orderId": { "_id": "o9", "total": 3 },
            "customer": { "name": "Ana" },
            "amount": { "value": 1 },
        }))
        .expect("payment");
        assert_eq!(payment.id, Some(EntityId::from("7")));
        assert_eq!(payment.order_id, Some(EntityId::from("o9")));
        assert_eq!(payment.customer_name.as_deref(), Some("Ana"));
        assert_eq!(payment.amount, None);
    }

    #[test]
    fn list_payload_accepts_each_envelope() {
        let data: ListPayload<RawProduct> =
            serde_json::from_str(r#"{"data":[{"id":1,"name":"Mug"}]}"#).expect("data");
        assert_eq!(data.into_items().len(), 1);

        let orders: ListPayload<RawOrder> =
            serde_json::from_str(r#"{"orders":[{"_id":"o1"},{"_id":"o2"}]}"#).expect("orders");
        let orders = orders.into_items();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].object_id, Some(EntityId::from("o1")));

        let bare: ListPayload<RawCustomer> =
            serde_json::from_str(r#"[{"email":"a@b.c"}]"#).expect("bare");
        assert_eq!(bare.into_items().len(), 1);
    }

    #[test]
    fn id_list_body_uses_kind_specific_key() {
        let body = IdListBody::bulk_delete(EntityKind::Order, vec![EntityId::from("a")]);
        assert_eq!(
            serde_json::to_value(&body).expect("json"),
            serde_json::json!({ "order_ids": ["a"] })
        );

        let body = IdListBody::export(EntityKind::Product, Vec::new());
        assert_eq!(
            serde_json::to_value(&body).expect("json"),
            serde_json::json!({ "productIds": [] })
        );
    }

    #[test]
    fn import_response_defaults_missing_sections() {
        let response: ImportResponse = serde_json::from_str(
            r#"{"success":true,"summary":{"total":3,"successful":2,"failed":1},
                "details":{"failed":[{"row":4,"error":"bad price"}]}}"#,
        )
        .expect("import response");
        assert_eq!(response.summary.duplicates, 0);
        assert_eq!(response.details.failed[0].describe(), "row 4: bad price");
        assert!(response.details.duplicates.is_empty());
    }
}
