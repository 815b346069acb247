use eventhub_shared::{BookingStatus, EventId, EventListing, Masked};

use crate::{CoreError, CoreResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    /// The only method the booking backend knows. The wire tag really is `CARDs`.
    #[default]
    #[serde(rename = "CARDs")]
    Card,
}

/// Card fields as entered. `card_no` is always stored without separators.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub name: String,
    pub card_no: Masked<String>,
    pub exp: String,
    pub cvc: Masked<String>,
}

/// The body of `POST /bookings`.
///
/// Price and name are snapshotted from the event at submission time; the backend
/// stays the source of truth for the final charge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub event_id: EventId,
    pub event_name: String,
    pub event_price: Decimal,
    pub customer_email: String,
    pub customer_name: String,
    pub number_of_tickets: u32,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub card_details: CardDetails,
}

impl BookingRequest {
    /// Snapshots `event` and derives the total from its current price.
    pub fn for_event(
        event: &EventListing,
        fallback_id: &EventId,
        customer_name: String,
        customer_email: String,
        number_of_tickets: u32,
        payment_method: PaymentMethod,
        card_details: CardDetails,
    ) -> CoreResult<Self> {
        Ok(Self {
            event_id: event.id.clone().unwrap_or_else(|| fallback_id.clone()),
            event_name: event.name.clone(),
            event_price: event.ticket_price,
            customer_email,
            customer_name,
            number_of_tickets,
            total_amount: total_amount(event.ticket_price, number_of_tickets)?,
            payment_method,
            card_details,
        })
    }
}

/// `unit_price * tickets`, rounded to cents.
pub fn total_amount(unit_price: Decimal, tickets: u32) -> CoreResult<Decimal> {
    unit_price
        .checked_mul(Decimal::from(tickets))
        .map(|total| total.round_dp(2))
        .ok_or_else(|| {
            CoreError::ValidationError(format!(
                "Total for {} ticket(s) at {} is out of range",
                tickets, unit_price
            ))
        })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub event_id: EventId,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub number_of_tickets: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub booking_date: String,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ticket_numbers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventListing>,
}

impl BookingResponse {
    /// Some backend versions report `quantity` instead of `numberOfTickets`.
    pub fn tickets(&self) -> u32 {
        self.quantity.unwrap_or(self.number_of_tickets)
    }

    /// Same story for `totalPrice` vs `totalAmount`.
    pub fn amount(&self) -> Decimal {
        self.total_price.unwrap_or(self.total_amount)
    }

    pub fn display_event_name(&self) -> Option<&str> {
        self.event_name
            .as_deref()
            .or_else(|| self.event.as_ref().map(|e| e.name.as_str()))
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
