use async_trait::async_trait;

use crate::booking::{BookingRequest, BookingResponse};

#[async_trait]
pub trait BookingTransport: Send + Sync {
    /// Send a validated booking to the backend, exactly once.
    ///
    /// The error's `Display` text is what the customer gets to see.
    async fn submit_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingResponse, Box<dyn std::error::Error + Send + Sync>>;
}
