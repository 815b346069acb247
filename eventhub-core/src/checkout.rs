//! Booking submission lifecycle.
//!
//! ```text
//! Idle ──submit──▶ Validating ──errors──▶ Idle
//!                      │
//!                      └──ok──▶ Submitting ──▶ Succeeded | Failed(message)
//! ```
//!
//! A second submit while `Validating` or `Submitting` is refused before anything
//! reaches the network.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use eventhub_shared::EventListing;
use tracing::Instrument;
use uuid::Uuid;

use crate::booking::BookingResponse;
use crate::form::BookingForm;
use crate::transport::BookingTransport;
use crate::validation::ValidationErrorSet;
use crate::CoreError;

/// How long the confirmation stays on screen before moving on to the booking list.
pub const CONFIRMATION_REDIRECT_DELAY: Duration = Duration::from_secs(3);

pub const GENERIC_FAILURE: &str = "Failed to create booking. Please try again.";

const INTERRUPTED: &str = "Booking submission was interrupted. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    Succeeded(BookingResponse),
    Failed(String),
}

impl SubmissionState {
    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionState::Validating | SubmissionState::Submitting)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("A booking is already being submitted")]
    InProgress,

    #[error("Booking form has {} invalid field(s)", .0.len())]
    Invalid(ValidationErrorSet),

    #[error("{0}")]
    Transport(String),

    #[error(transparent)]
    Pricing(#[from] CoreError),
}

pub struct Checkout<T> {
    transport: T,
    state: Mutex<SubmissionState>,
}

impl<T: BookingTransport> Checkout<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().clone()
    }

    pub fn is_submitting(&self) -> bool {
        *self.lock() == SubmissionState::Submitting
    }

    /// Back to `Idle` after a success or failure has been shown. No-op while busy.
    pub fn reset(&self) {
        let mut state = self.lock();
        if !state.is_busy() {
            *state = SubmissionState::Idle;
        }
    }

    /// Validates `form`, then sends it for `event`.
    ///
    /// Field errors are written back into the form and returned; nothing is sent.
    /// A transport failure comes back as a single message and leaves the checkout
    /// in `Failed`, ready for another attempt.
    pub async fn submit(
        &self,
        form: &mut BookingForm,
        event: &EventListing,
    ) -> Result<BookingResponse, CheckoutError> {
        {
            let mut state = self.lock();
            if state.is_busy() {
                tracing::warn!("Ignoring booking submit while another is in flight");
                return Err(CheckoutError::InProgress);
            }
            *state = SubmissionState::Validating;
        }

        let errors = form.validate();
        form.replace_errors(errors.clone());
        if !errors.is_empty() {
            tracing::info!("Booking form rejected with {} field error(s)", errors.len());
            *self.lock() = SubmissionState::Idle;
            return Err(CheckoutError::Invalid(errors));
        }

        let request = match form.to_request(event) {
            Ok(request) => request,
            Err(err) => {
                tracing::error!("Could not price booking: {}", err);
                *self.lock() = SubmissionState::Failed(err.to_string());
                return Err(err.into());
            }
        };
        let span = tracing::info_span!(
            "booking_submission",
            attempt_id = %Uuid::new_v4(),
            event_id = %request.event_id,
            tickets = request.number_of_tickets,
        );

        let mut guard = SubmittingGuard::enter(&self.state);
        let result = self
            .transport
            .submit_booking(&request)
            .instrument(span)
            .await;

        match result {
            Ok(response) => {
                tracing::info!("Booking {} created with status {}", response.id, response.status);
                guard.settle(SubmissionState::Succeeded(response.clone()));
                Ok(response)
            }
            Err(err) => {
                let message = match err.to_string() {
                    m if m.trim().is_empty() => GENERIC_FAILURE.to_string(),
                    m => m,
                };
                tracing::error!("Booking submission failed: {}", message);
                guard.settle(SubmissionState::Failed(message.clone()));
                Err(CheckoutError::Transport(message))
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SubmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the checkout in `Submitting`. If dropped without a verdict (the caller
/// dropped the future mid-request) the state falls back to `Failed`.
struct SubmittingGuard<'a> {
    state: &'a Mutex<SubmissionState>,
    settled: bool,
}

impl<'a> SubmittingGuard<'a> {
    fn enter(state: &'a Mutex<SubmissionState>) -> Self {
        *state.lock().unwrap_or_else(PoisonError::into_inner) = SubmissionState::Submitting;
        Self { state, settled: false }
    }

    fn settle(&mut self, outcome: SubmissionState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = outcome;
        self.settled = true;
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            *self.state.lock().unwrap_or_else(PoisonError::into_inner) =
                SubmissionState::Failed(INTERRUPTED.to_string());
        }
    }
}
