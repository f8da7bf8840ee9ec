use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::store::Document;

pub const TICKET_NOT_FOUND: &str = "Ticket not found";
pub const TICKET_UPDATED: &str = "Ticket updated successfully";
pub const TICKET_DELETED: &str = "Ticket deleted successfully";

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (not written)
/// * JSON field = null  => `Some(None)`    (written as null)
/// * JSON field = value => `Some(Some(v))` (written as value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Бронирование билета. В хранилище попадают только явно заданные поля:
/// отсутствующее поле не пишется совсем, явный null записывается как null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketBooking {
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub user_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub event: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub seats: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub status: Option<Option<String>>,
}

impl TicketBooking {
    /// Only the explicitly provided fields end up in the returned map.
    pub fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(serde::ser::Error::custom(format!(
                "booking serialized to a non-object value: {other}"
            ))),
        }
    }
}

/// Внешнее представление бронирования: id строкой, недостающие поля = null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketBookingView {
    pub id: String,
    pub user_name: Option<String>,
    pub event: Option<String>,
    pub date: Option<NaiveDate>,
    pub seats: Option<u32>,
    pub status: Option<String>,
}

// Поле документа; null, отсутствие и значение не того типа дают None
fn field<T: DeserializeOwned>(document: &Document, key: &'static str) -> Option<T> {
    let value = document.body.get(key).filter(|value| !value.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!(id = %document.id, key, "ignoring mistyped ticket field: {}", e);
            None
        }
    }
}

impl TicketBookingView {
    /// Maps a raw stored document onto the view model. Never fails: each known
    /// key is decoded on its own, unknown keys are ignored.
    pub fn from_document(document: &Document) -> Self {
        TicketBookingView {
            id: document.id.to_string(),
            user_name: field(document, "user_name"),
            event: field(document, "event"),
            date: field(document, "date"),
            seats: field(document, "seats"),
            status: field(document, "status"),
        }
    }
}

/// Result of an operation addressed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Lookup::Found(value),
            None => Lookup::NotFound,
        }
    }
}

impl Lookup<OperationReply> {
    /// Сворачивает результат update/delete в ответ `{message}` или `{error}`.
    pub fn into_reply(self) -> OperationReply {
        match self {
            Lookup::Found(reply) => reply,
            Lookup::NotFound => OperationReply::not_found(),
        }
    }
}

/// Reply shape of the mutating operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperationReply {
    Message { message: String },
    Error { error: String },
}

impl OperationReply {
    pub fn message(text: impl Into<String>) -> Self {
        OperationReply::Message { message: text.into() }
    }

    pub fn not_found() -> Self {
        OperationReply::Error { error: TICKET_NOT_FOUND.to_string() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, OperationReply::Error { .. })
    }
}
