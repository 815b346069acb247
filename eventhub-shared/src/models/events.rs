use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend event identifiers arrive either as strings or as bare numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(u64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Number(n) => write!(f, "{}", n),
            EventId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        EventId::Text(value.to_string())
    }
}

impl From<u64> for EventId {
    fn from(value: u64) -> Self {
        EventId::Number(value)
    }
}

/// An event as listed by the events service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventListing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub venue: String,
    pub start_date_time: String,
    pub end_date_time: String,
    pub ticket_price: Decimal,
    #[serde(default)]
    pub total_tickets: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_tickets: Option<u32>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub organizer_name: String,
    #[serde(default)]
    pub organizer_email: String,
}

impl EventListing {
    /// Tickets still on sale, when the backend reports sales.
    pub fn available_tickets(&self) -> Option<u32> {
        self.sold_tickets
            .map(|sold| self.total_tickets.saturating_sub(sold))
    }
}

/// Payload for creating an event. Same shape as a listing, without server-owned fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub location: String,
    pub venue: String,
    pub start_date_time: String,
    pub end_date_time: String,
    pub ticket_price: Decimal,
    pub total_tickets: u32,
    pub category: String,
    pub image_url: String,
    pub organizer_name: String,
    pub organizer_email: String,
}

/// Partial update for an existing event. Absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tickets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
