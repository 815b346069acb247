use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventhub_core::card::mask_card_number;
use eventhub_core::{BookingRequest, BookingResponse, BookingTransport};
use eventhub_shared::{BookingStatus, StatusUpdate};
use serde_json::json;
use tracing::{error, info};

use crate::error::ClientResult;
use crate::http::{data_field, unwrap_envelope, ApiClient};

/// Client for the bookings service.
#[derive(Clone)]
pub struct BookingClient {
    api: ApiClient,
}

impl BookingClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `POST /bookings`. The card number only ever shows up masked in the logs.
    pub async fn create_booking(&self, request: &BookingRequest) -> ClientResult<BookingResponse> {
        info!(
            "Creating booking: event={} tickets={} total={} card={}",
            request.event_id,
            request.number_of_tickets,
            request.total_amount,
            mask_card_number(request.card_details.card_no.expose()),
        );

        let body = self.api.post("/bookings", request).await.map_err(|e| {
            error!("Failed to create booking: {}", e);
            e
        })?;
        let booking: BookingResponse = serde_json::from_value(unwrap_envelope(body))?;

        info!("Booking created successfully: {} ({})", booking.id, booking.status);
        Ok(booking)
    }

    /// Bookings of the signed-in user. Failures are logged and read as "no bookings".
    pub async fn get_user_bookings(&self) -> Vec<BookingResponse> {
        self.fetch_user_bookings().await.unwrap_or_else(|e| {
            error!("Failed to fetch user bookings: {}", e);
            Vec::new()
        })
    }

    pub async fn get_booking_by_id(&self, booking_id: &str) -> Option<BookingResponse> {
        self.fetch_booking(booking_id).await.unwrap_or_else(|e| {
            error!("Failed to fetch booking {}: {}", booking_id, e);
            None
        })
    }

    async fn fetch_user_bookings(&self) -> ClientResult<Vec<BookingResponse>> {
        let body = self.api.get("/bookings").await?;
        match data_field(body) {
            Some(data) => Ok(serde_json::from_value(data)?),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_booking(&self, booking_id: &str) -> ClientResult<Option<BookingResponse>> {
        let body = self.api.get(&format!("/bookings/{}", booking_id)).await?;
        match data_field(body) {
            Some(data) => Ok(Some(serde_json::from_value(data)?)),
            None => Ok(None),
        }
    }

    /// `PUT /bookings/cancel/{id}`; the backend wants the whole booking back in the body.
    pub async fn cancel_booking(&self, booking: &BookingResponse) -> ClientResult<()> {
        self.api
            .put(&format!("/bookings/cancel/{}", booking.id), &json!({ "booking": booking }))
            .await
            .map_err(|e| {
                error!("Failed to cancel booking {}: {}", booking.id, e);
                e
            })?;
        info!("Booking {} cancelled", booking.id);
        Ok(())
    }

    pub async fn update_booking_status(
        &self,
        booking_id: &str,
        status: StatusUpdate,
    ) -> ClientResult<BookingResponse> {
        let body = self
            .api
            .put(&format!("/bookings/{}/status", booking_id), &json!({ "status": status }))
            .await
            .map_err(|e| {
                error!("Failed to update booking status for {}: {}", booking_id, e);
                e
            })?;
        Ok(serde_json::from_value(unwrap_envelope(body))?)
    }
}

#[async_trait]
impl BookingTransport for BookingClient {
    async fn submit_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingResponse, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.create_booking(request).await?)
    }
}

/// Status filter for the "my bookings" list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookingFilter {
    #[default]
    All,
    Status(BookingStatus),
}

impl BookingFilter {
    pub fn matches(&self, booking: &BookingResponse) -> bool {
        match self {
            BookingFilter::All => true,
            BookingFilter::Status(status) => booking.status == *status,
        }
    }
}

/// Keeps the bookings matching `filter`, newest `bookingDate` first.
/// Bookings with an unreadable date go last, in their original order.
pub fn filter_bookings(mut bookings: Vec<BookingResponse>, filter: BookingFilter) -> Vec<BookingResponse> {
    bookings.retain(|booking| filter.matches(booking));
    bookings.sort_by_key(|booking| {
        Reverse(
            DateTime::parse_from_rfc3339(&booking.booking_date)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        )
    });
    bookings
}
