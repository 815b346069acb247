use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use eventhub_shared::{EventDraft, EventListing, EventPatch};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, error};

use crate::error::{ClientError, ClientResult};
use crate::http::{data_field, ApiClient};

static OFFSET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[+-]\d{2}:\d{2}$").expect("offset regex"));
static WITH_SECONDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"T\d{2}:\d{2}:\d{2}").expect("seconds regex"));
static ENDS_WITH_SECONDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"T\d{2}:\d{2}:\d{2}$").expect("seconds regex"));
static ENDS_WITH_MILLIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"T\d{2}:\d{2}:\d{2}\.\d{3}$").expect("millis regex"));

/// Categories an organizer can pick from when creating an event.
pub const EVENT_CATEGORIES: [&str; 10] = [
    "Technology",
    "Music",
    "Food & Drink",
    "Sports",
    "Arts",
    "Business",
    "Education",
    "Health & Wellness",
    "Entertainment",
    "Other",
];

/// Category filter value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Ended,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Ended => "ended",
        })
    }
}

/// Client for the events service.
#[derive(Clone)]
pub struct EventsClient {
    api: ApiClient,
}

impl EventsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get_events(&self) -> Vec<EventListing> {
        self.fetch_list("/events/get-all-events").await
    }

    /// Events owned by the signed-in organizer.
    pub async fn get_organizer_events(&self) -> Vec<EventListing> {
        self.fetch_list("/events/my-events").await
    }

    pub async fn get_event_by_id(&self, event_id: &str) -> Option<EventListing> {
        let result: ClientResult<Option<EventListing>> =
            match self.api.get(&format!("/events/{}", event_id)).await {
                Ok(body) => data_field(body)
                    .map(serde_json::from_value)
                    .transpose()
                    .map_err(ClientError::from),
                Err(e) => Err(e),
            };

        result.unwrap_or_else(|e| {
            error!("Failed to fetch event {}: {}", event_id, e);
            None
        })
    }

    pub async fn create_event(&self, draft: &EventDraft) -> ClientResult<EventListing> {
        let mut draft = draft.clone();
        draft.start_date_time = format_datetime_for_backend(&draft.start_date_time)?;
        draft.end_date_time = format_datetime_for_backend(&draft.end_date_time)?;

        let body = self.api.post("/events/create", &draft).await.map_err(|e| {
            error!("Failed to create event: {}", e);
            e
        })?;
        Ok(serde_json::from_value(data_field(body).unwrap_or_default())?)
    }

    pub async fn update_event(&self, event_id: &str, patch: &EventPatch) -> ClientResult<EventListing> {
        let mut patch = patch.clone();
        if let Some(start) = patch.start_date_time.as_deref().filter(|s| !s.is_empty()) {
            patch.start_date_time = Some(format_datetime_for_backend(start)?);
        }
        if let Some(end) = patch.end_date_time.as_deref().filter(|s| !s.is_empty()) {
            patch.end_date_time = Some(format_datetime_for_backend(end)?);
        }

        let body = self
            .api
            .put(&format!("/events/{}", event_id), &patch)
            .await
            .map_err(|e| {
                error!("Failed to update event {}: {}", event_id, e);
                e
            })?;
        Ok(serde_json::from_value(data_field(body).unwrap_or_default())?)
    }

    pub async fn delete_event(&self, event_id: &str) -> ClientResult<()> {
        self.api
            .delete(&format!("/events/{}", event_id))
            .await
            .map_err(|e| {
                error!("Failed to delete event {}: {}", event_id, e);
                e
            })?;
        Ok(())
    }

    async fn fetch_list(&self, endpoint: &str) -> Vec<EventListing> {
        let result: ClientResult<Vec<EventListing>> = match self.api.get(endpoint).await {
            Ok(body) => data_field(body)
                .map(serde_json::from_value)
                .transpose()
                .map(Option::unwrap_or_default)
                .map_err(ClientError::from),
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            error!("Failed to fetch events: {}", e);
            Vec::new()
        })
    }
}

/// Normalizes a datetime from an HTML `datetime-local` style input into the
/// ISO-8601 form the events service stores (`2030-05-01T19:00:00.000Z`).
///
/// Values that already carry `Z` or a `+HH:MM` offset are passed through untouched.
/// Naive values are taken as UTC.
pub fn format_datetime_for_backend(value: &str) -> ClientResult<String> {
    if value.is_empty() {
        return Err(ClientError::MissingDateTime);
    }

    if value.contains('Z') || OFFSET_RE.is_match(value) {
        return Ok(value.to_string());
    }

    if value.contains('T') {
        let formatted = if WITH_SECONDS_RE.is_match(value) {
            if ENDS_WITH_SECONDS_RE.is_match(value) {
                format!("{}.000Z", value)
            } else if ENDS_WITH_MILLIS_RE.is_match(value) {
                format!("{}Z", value)
            } else {
                value.to_string()
            }
        } else {
            format!("{}:00.000Z", value)
        };
        debug!("Formatted datetime {} -> {}", value, formatted);
        return Ok(formatted);
    }

    let parsed = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        })
        .map_err(|_| ClientError::InvalidDateTime(value.to_string()))?;

    Ok(DateTime::<Utc>::from_naive_utc_and_offset(parsed, Utc).to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Renders a price the way the storefront shows it, e.g. `LKR 2,500.00`.
pub fn format_price(price: Decimal) -> String {
    let rounded = price.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}LKR {}.{}", if negative { "-" } else { "" }, grouped, cents)
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Whether an event starts after `now`. Unparseable start times count as past.
pub fn is_event_upcoming(event: &EventListing, now: DateTime<Utc>) -> bool {
    parse_instant(&event.start_date_time).is_some_and(|start| start > now)
}

/// Whether `now` falls between start and end, both inclusive.
pub fn is_event_ongoing(event: &EventListing, now: DateTime<Utc>) -> bool {
    match (
        parse_instant(&event.start_date_time),
        parse_instant(&event.end_date_time),
    ) {
        (Some(start), Some(end)) => start <= now && now <= end,
        _ => false,
    }
}

/// Anything neither upcoming nor ongoing has ended, including events with
/// unparseable times.
pub fn event_status(event: &EventListing, now: DateTime<Utc>) -> EventStatus {
    if is_event_upcoming(event, now) {
        EventStatus::Upcoming
    } else if is_event_ongoing(event, now) {
        EventStatus::Ongoing
    } else {
        EventStatus::Ended
    }
}

/// Listing filter: `search` matches name, description or location ignoring case;
/// `category` must match exactly unless it is empty or [`ALL_CATEGORIES`].
pub fn filter_events<'a>(
    events: &'a [EventListing],
    search: &str,
    category: &str,
) -> Vec<&'a EventListing> {
    let needle = search.to_lowercase();
    events
        .iter()
        .filter(|event| {
            needle.is_empty()
                || [&event.name, &event.description, &event.location]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
        })
        .filter(|event| {
            category.is_empty() || category == ALL_CATEGORIES || event.category == category
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_datetime_passthrough() {
        assert_eq!(
            format_datetime_for_backend("2030-05-01T19:00:00.000Z").unwrap(),
            "2030-05-01T19:00:00.000Z"
        );
        assert_eq!(
            format_datetime_for_backend("2030-05-01T19:00:00+05:30").unwrap(),
            "2030-05-01T19:00:00+05:30"
        );
    }

    #[test]
    fn test_datetime_local_inputs_are_completed() {
        assert_eq!(format_datetime_for_backend("2030-05-01T19:00").unwrap(), "2030-05-01T19:00:00.000Z");
        assert_eq!(format_datetime_for_backend("2030-05-01T19:00:30").unwrap(), "2030-05-01T19:00:30.000Z");
        assert_eq!(format_datetime_for_backend("2030-05-01T19:00:30.250").unwrap(), "2030-05-01T19:00:30.250Z");
    }

    #[test]
    fn test_datetime_fallback_parsing() {
        assert_eq!(format_datetime_for_backend("2030-05-01").unwrap(), "2030-05-01T00:00:00.000Z");
        assert_eq!(format_datetime_for_backend("2030-05-01 19:15").unwrap(), "2030-05-01T19:15:00.000Z");
        assert!(matches!(format_datetime_for_backend(""), Err(ClientError::MissingDateTime)));
        assert!(matches!(
            format_datetime_for_backend("next friday"),
            Err(ClientError::InvalidDateTime(_))
        ));
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Decimal::new(250000, 2)), "LKR 2,500.00");
        assert_eq!(format_price(Decimal::new(1234567891, 2)), "LKR 12,345,678.91");
        assert_eq!(format_price(Decimal::new(5, 1)), "LKR 0.50");
        assert_eq!(format_price(Decimal::ZERO), "LKR 0.00");
    }

    fn listing(name: &str, location: &str, category: &str) -> EventListing {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "description": format!("{} live", name),
            "location": location,
            "category": category,
            "startDateTime": "2030-05-01T19:00:00.000Z",
            "endDateTime": "2030-05-01T23:00:00.000Z",
            "ticketPrice": 10.0
        }))
        .unwrap()
    }

    #[test]
    fn test_filter_events_by_search_and_category() {
        let events = vec![
            listing("Jazz Night", "Colombo", "Music"),
            listing("Rust Meetup", "Kandy", "Technology"),
            listing("Food Fair", "Colombo", "Food & Drink"),
        ];

        let names = |found: Vec<&EventListing>| {
            found.iter().map(|e| e.name.clone()).collect::<Vec<_>>()
        };

        assert_eq!(filter_events(&events, "", ALL_CATEGORIES).len(), 3);
        assert_eq!(filter_events(&events, "", "").len(), 3);
        assert_eq!(names(filter_events(&events, "COLOMBO", "All")), ["Jazz Night", "Food Fair"]);
        assert_eq!(names(filter_events(&events, "meetup", "All")), ["Rust Meetup"]);
        // Description is searched too.
        assert_eq!(names(filter_events(&events, "fair live", "All")), ["Food Fair"]);
        assert_eq!(names(filter_events(&events, "colombo", "Music")), ["Jazz Night"]);
        assert!(filter_events(&events, "", "music").is_empty());
        assert!(filter_events(&events, "opera", "All").is_empty());
    }

    #[test]
    fn test_event_status() {
        let event = listing("Jazz Night", "Colombo", "Music");

        let at = |h| Utc.with_ymd_and_hms(2030, 5, 1, h, 0, 0).unwrap();
        assert_eq!(event_status(&event, at(18)), EventStatus::Upcoming);
        assert_eq!(event_status(&event, at(19)), EventStatus::Ongoing);
        assert_eq!(event_status(&event, at(23)), EventStatus::Ongoing);
        assert_eq!(event_status(&event, Utc.with_ymd_and_hms(2030, 5, 2, 0, 0, 0).unwrap()), EventStatus::Ended);
        assert!(is_event_ongoing(&event, at(21)));
        assert!(!is_event_ongoing(&event, at(18)));

        let mut broken = event.clone();
        broken.end_date_time = "soon".to_string();
        assert_eq!(event_status(&broken, at(21)), EventStatus::Ended);
        assert_eq!(EventStatus::Ongoing.to_string(), "ongoing");
    }

    #[test]
    fn test_categories() {
        assert_eq!(EVENT_CATEGORIES.len(), 10);
        assert!(EVENT_CATEGORIES.contains(&"Health & Wellness"));
        assert!(!EVENT_CATEGORIES.contains(&ALL_CATEGORIES));
    }

    #[test]
    fn test_is_event_upcoming() {
        let event: EventListing = serde_json::from_value(serde_json::json!({
            "name": "Jazz Night",
            "startDateTime": "2030-05-01T19:00:00.000Z",
            "endDateTime": "2030-05-01T23:00:00.000Z",
            "ticketPrice": 10.0
        }))
        .unwrap();

        assert!(is_event_upcoming(&event, Utc.with_ymd_and_hms(2029, 1, 1, 0, 0, 0).unwrap()));
        assert!(!is_event_upcoming(&event, Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap()));
    }
}
