//! Submission gate: every rule runs, every failing field is reported.

use crate::card;
use crate::form::{BookingForm, CardField, Field};
use chrono::{Local, NaiveDate};
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Field-keyed validation messages. Empty means the form may be submitted.
///
/// Serializes as a flat map of dotted keys, e.g. `{"card.exp": "Invalid expiry date"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrorSet {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn clear(&mut self, field: Field) -> Option<String> {
        self.errors.remove(&field)
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl Serialize for ValidationErrorSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (field, message) in &self.errors {
            map.serialize_entry(field.key(), message)?;
        }
        map.end()
    }
}

impl BookingForm {
    /// Runs the gate against today's local date.
    pub fn validate(&self) -> ValidationErrorSet {
        self.validate_at(Local::now().date_naive())
    }

    pub fn validate_at(&self, today: NaiveDate) -> ValidationErrorSet {
        let mut errors = ValidationErrorSet::new();

        if self.customer_name().trim().is_empty() {
            errors.insert(Field::CustomerName, "Name is required");
        }

        let email = self.customer_email();
        if email.trim().is_empty() {
            errors.insert(Field::CustomerEmail, "Email is required");
        } else if !EMAIL_RE.is_match(email) {
            errors.insert(Field::CustomerEmail, "Invalid email format");
        }

        if self.number_of_tickets() < 1 {
            errors.insert(Field::NumberOfTickets, "At least 1 ticket is required");
        }

        let card_details = self.card();
        if card_details.name.trim().is_empty() {
            errors.insert(Field::Card(CardField::Name), "Cardholder name is required");
        }

        // No checksum or brand detection, presence only.
        if card_details.card_no.expose().is_empty() {
            errors.insert(Field::Card(CardField::CardNo), "Card number is required");
        }

        if card_details.exp.is_empty() {
            errors.insert(Field::Card(CardField::Exp), "Expiry date is required");
        } else if !card::validate_expiry_at(&card_details.exp, today) {
            errors.insert(Field::Card(CardField::Exp), "Invalid expiry date");
        }

        let cvc = card_details.cvc.expose();
        if cvc.is_empty() {
            errors.insert(Field::Card(CardField::Cvc), "CVC is required");
        } else if !card::validate_cvc(cvc) {
            errors.insert(Field::Card(CardField::Cvc), "Invalid CVC");
        }

        errors
    }
}
