use std::env;
use std::sync::Arc;

use anyhow::Context;
use eventhub_client::events::format_price;
use eventhub_client::{event_status, filter_bookings, BookingFilter, Config, EventHubClients, EventStatus};
use eventhub_core::checkout::CONFIRMATION_REDIRECT_DELAY;
use eventhub_core::{
    BookingForm, CardField, Checkout, CheckoutError, Field, InMemorySession, SessionStore,
};
use eventhub_shared::EventId;
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Form contents as saved by the storefront, e.g.
/// `{"customerName": "...", "numberOfTickets": 2, "cardDetails": {"cardNo": "4242 ..."}}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutDraft {
    #[serde(default)]
    customer_name: String,
    #[serde(default)]
    customer_email: String,
    #[serde(default = "one")]
    number_of_tickets: u32,
    #[serde(default)]
    card_details: CardDraft,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardDraft {
    #[serde(default)]
    name: String,
    #[serde(default)]
    card_no: String,
    #[serde(default)]
    exp: String,
    #[serde(default)]
    cvc: String,
}

fn one() -> u32 {
    1
}

impl CheckoutDraft {
    /// Blank customer fields keep whatever the signed-in user prefilled.
    fn apply(&self, form: &mut BookingForm) -> eventhub_core::CoreResult<()> {
        if !self.customer_name.is_empty() {
            form.edit(Field::CustomerName, &self.customer_name)?;
        }
        if !self.customer_email.is_empty() {
            form.edit(Field::CustomerEmail, &self.customer_email)?;
        }
        form.set_number_of_tickets(self.number_of_tickets);
        form.edit(Field::Card(CardField::Name), &self.card_details.name)?;
        form.edit(Field::Card(CardField::CardNo), &self.card_details.card_no)?;
        form.edit(Field::Card(CardField::Exp), &self.card_details.exp)?;
        form.edit(Field::Card(CardField::Cvc), &self.card_details.cvc)?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventhub_client=debug,eventhub_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = env::args().skip(1);
    let (draft_path, event_id) = match (args.next(), args.next()) {
        (Some(draft), Some(event)) => (draft, event),
        _ => anyhow::bail!("usage: eventhub-checkout <draft.json> <event-id>"),
    };

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Using bookings service at {}", config.api.bookings_base_url);

    let session: Arc<dyn SessionStore> = match env::var("EVENTHUB_TOKEN") {
        Ok(token) => Arc::new(InMemorySession::with_token(token)),
        Err(_) => Arc::new(InMemorySession::new()),
    };
    let clients = EventHubClients::from_config(&config, session)?;

    let event = clients
        .events
        .get_event_by_id(&event_id)
        .await
        .with_context(|| format!("Event {} not found", event_id))?;

    let status = event_status(&event, chrono::Utc::now());
    if status == EventStatus::Ended {
        tracing::warn!("Event {} has already ended", event.name);
    }

    let raw = tokio::fs::read_to_string(&draft_path)
        .await
        .with_context(|| format!("Failed to read {}", draft_path))?;
    let draft: CheckoutDraft = serde_json::from_str(&raw).context("Malformed checkout draft")?;

    let mut form = BookingForm::new(EventId::from(event_id.as_str()), draft.number_of_tickets);
    form.set_payment_method(config.checkout.payment_method);
    if let Some(user) = clients.auth.current_user().await {
        form.prefill(&user);
    }
    draft.apply(&mut form)?;

    tracing::info!(
        "Booking {} x {} ({}, {}) = {}",
        form.number_of_tickets(),
        event.name,
        status,
        format_price(event.ticket_price),
        format_price(form.total_amount(event.ticket_price)?),
    );

    let checkout = Checkout::new(clients.bookings.clone());
    match checkout.submit(&mut form, &event).await {
        Ok(booking) => {
            println!("{}", serde_json::to_string_pretty(&booking)?);
            tracing::info!(
                "Booking confirmed, loading your bookings in {}s",
                CONFIRMATION_REDIRECT_DELAY.as_secs()
            );
            tokio::time::sleep(CONFIRMATION_REDIRECT_DELAY).await;

            for booking in filter_bookings(clients.bookings.get_user_bookings().await, BookingFilter::All) {
                println!(
                    "{}  {}  x{}  {}  {}",
                    booking.id,
                    booking.display_event_name().unwrap_or("-"),
                    booking.tickets(),
                    format_price(booking.amount()),
                    booking.status,
                );
            }
            Ok(())
        }
        Err(CheckoutError::Invalid(errors)) => {
            eprintln!("{}", serde_json::to_string_pretty(&errors)?);
            anyhow::bail!("Booking form has {} invalid field(s)", errors.len())
        }
        Err(e) => Err(e.into()),
    }
}
