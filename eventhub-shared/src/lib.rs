pub mod models;
pub mod pii;

pub use models::bookings::{BookingStatus, StatusUpdate};
pub use models::events::{EventDraft, EventId, EventListing, EventPatch};
pub use pii::Masked;
