use serde::Deserialize;
use std::env;
use std::time::Duration;

use eventhub_core::PaymentMethod;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub bookings_base_url: String,
    pub auth_base_url: String,
    pub events_base_url: String,
    /// Unset means requests may wait forever, like a browser `fetch`.
    pub request_timeout_secs: Option<u64>,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .set_default("api.bookings_base_url", "http://localhost:3001")?
            .set_default("api.auth_base_url", "http://localhost:3000")?
            .set_default("api.events_base_url", "http://localhost:3002")?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. EVENTHUB__API__BOOKINGS_BASE_URL=https://bookings.example.com
            .add_source(config::Environment::with_prefix("EVENTHUB").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Config pointing every service at one base URL. Handy for tests and local stubs.
    pub fn from_urls(base_url: &str) -> Self {
        Self {
            api: ApiConfig {
                bookings_base_url: base_url.to_string(),
                auth_base_url: base_url.to_string(),
                events_base_url: base_url.to_string(),
                request_timeout_secs: None,
            },
            checkout: CheckoutConfig::default(),
        }
    }

    /// Shared HTTP client honouring the configured timeout.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.api.request_timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}
