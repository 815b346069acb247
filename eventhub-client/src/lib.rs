pub mod app_config;
pub mod auth;
pub mod bookings;
pub mod error;
pub mod events;
pub mod http;

use std::sync::Arc;

use eventhub_core::SessionStore;

pub use app_config::Config;
pub use auth::{AuthClient, AuthOutcome, SignUp};
pub use bookings::{filter_bookings, BookingClient, BookingFilter};
pub use error::{ClientError, ClientResult};
pub use events::{event_status, filter_events, EventStatus, EventsClient};
pub use http::ApiClient;

/// The three service clients, sharing one HTTP connection pool and one session.
#[derive(Clone)]
pub struct EventHubClients {
    pub auth: AuthClient,
    pub bookings: BookingClient,
    pub events: EventsClient,
}

impl EventHubClients {
    pub fn from_config(config: &Config, session: Arc<dyn SessionStore>) -> ClientResult<Self> {
        let http = config.http_client()?;
        let api = |base_url: &str| ApiClient::new(http.clone(), base_url, session.clone());

        Ok(Self {
            auth: AuthClient::new(api(&config.api.auth_base_url)),
            bookings: BookingClient::new(api(&config.api.bookings_base_url)),
            events: EventsClient::new(api(&config.api.events_base_url)),
        })
    }
}
