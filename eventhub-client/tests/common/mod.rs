//! Stub backend shared by the integration tests.

use std::sync::{Arc, Mutex};

use axum::http::HeaderMap;
use axum::Router;
use eventhub_client::{Config, EventHubClients};
use eventhub_core::{InMemorySession, SessionStore};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Recorded>>>);

#[allow(dead_code)]
impl Recorder {
    pub fn record(&self, path: &str, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.0.lock().unwrap().push(Recorded {
            path: path.to_string(),
            authorization,
            body,
        });
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }
}

/// Bind to port 0 and return the base URL.
pub async fn start_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[allow(dead_code)]
pub fn clients(base_url: &str, session: Arc<InMemorySession>) -> EventHubClients {
    let session: Arc<dyn SessionStore> = session;
    EventHubClients::from_config(&Config::from_urls(base_url), session).unwrap()
}

#[allow(dead_code)]
pub fn event_json() -> Value {
    json!({
        "id": "evt-1",
        "name": "Jazz Night",
        "description": "Live jazz",
        "location": "Colombo",
        "venue": "Nelum Pokuna",
        "startDateTime": "2030-05-01T19:00:00.000Z",
        "endDateTime": "2030-05-01T23:00:00.000Z",
        "ticketPrice": 2500.0,
        "totalTickets": 200,
        "soldTickets": 20,
        "category": "Music",
        "imageUrl": "https://img.example.com/jazz.png",
        "organizerName": "Jane Roe",
        "organizerEmail": "jane@example.com"
    })
}

#[allow(dead_code)]
pub fn booking_json(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "eventId": "evt-1",
        "eventName": "Jazz Night",
        "customerEmail": "john@example.com",
        "customerName": "John Doe",
        "numberOfTickets": 2,
        "totalAmount": 5000.0,
        "paymentMethod": "CARDs",
        "bookingDate": "2030-01-01T10:00:00Z",
        "status": status
    })
}
