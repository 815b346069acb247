pub mod booking;
pub mod card;
pub mod checkout;
pub mod form;
pub mod identity;
pub mod transport;
pub mod validation;

pub use booking::{BookingRequest, BookingResponse, CardDetails, PaymentMethod};
pub use checkout::{Checkout, CheckoutError, SubmissionState};
pub use form::{BookingForm, CardField, Field};
pub use identity::{InMemorySession, SessionStore, UserIdentity};
pub use transport::BookingTransport;
pub use validation::ValidationErrorSet;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Unknown form field: {0}")]
    UnknownField(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
