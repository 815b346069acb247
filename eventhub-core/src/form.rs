use crate::booking::{self, BookingRequest, CardDetails, PaymentMethod};
use crate::card;
use crate::identity::UserIdentity;
use crate::validation::ValidationErrorSet;
use crate::{CoreError, CoreResult};
use eventhub_shared::{EventId, EventListing};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CardField {
    Name,
    CardNo,
    Exp,
    Cvc,
}

/// A form field. Renders to the dotted key used in error payloads (`card.exp`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    CustomerName,
    CustomerEmail,
    NumberOfTickets,
    Card(CardField),
}

impl Field {
    pub fn key(&self) -> &'static str {
        match self {
            Field::CustomerName => "customerName",
            Field::CustomerEmail => "customerEmail",
            Field::NumberOfTickets => "numberOfTickets",
            Field::Card(CardField::Name) => "card.name",
            Field::Card(CardField::CardNo) => "card.cardNo",
            Field::Card(CardField::Exp) => "card.exp",
            Field::Card(CardField::Cvc) => "card.cvc",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "customerName" => Field::CustomerName,
            "customerEmail" => Field::CustomerEmail,
            "numberOfTickets" => Field::NumberOfTickets,
            "card.name" => Field::Card(CardField::Name),
            // The card number input has historically been named without the prefix.
            "card.cardNo" | "cardNo" => Field::Card(CardField::CardNo),
            "card.exp" => Field::Card(CardField::Exp),
            "card.cvc" => Field::Card(CardField::Cvc),
            other => return Err(CoreError::UnknownField(other.to_string())),
        };
        Ok(field)
    }
}

/// Draft of a booking while the customer is filling it in.
#[derive(Debug, Clone)]
pub struct BookingForm {
    event_id: EventId,
    customer_name: String,
    customer_email: String,
    number_of_tickets: u32,
    payment_method: PaymentMethod,
    card: CardDetails,
    errors: ValidationErrorSet,
}

impl BookingForm {
    pub fn new(event_id: EventId, number_of_tickets: u32) -> Self {
        Self {
            event_id,
            customer_name: String::new(),
            customer_email: String::new(),
            number_of_tickets,
            payment_method: PaymentMethod::default(),
            card: CardDetails::default(),
            errors: ValidationErrorSet::new(),
        }
    }

    /// Copies name and email from the signed-in user. Card fields are never prefilled.
    pub fn prefill(&mut self, user: &UserIdentity) {
        self.customer_name = user.name.clone().unwrap_or_default();
        self.customer_email = user.email.clone();
    }

    /// Applies one edit and clears the error recorded for that field only.
    ///
    /// Card numbers are stored with separators stripped, whatever the input looked like.
    pub fn edit(&mut self, field: Field, value: &str) -> CoreResult<()> {
        match field {
            Field::CustomerName => self.customer_name = value.to_string(),
            Field::CustomerEmail => self.customer_email = value.to_string(),
            Field::NumberOfTickets => {
                self.number_of_tickets = value.trim().parse().map_err(|_| {
                    CoreError::ValidationError(format!("Not a ticket count: {:?}", value))
                })?;
            }
            Field::Card(CardField::Name) => self.card.name = value.to_string(),
            Field::Card(CardField::CardNo) => {
                *self.card.card_no.expose_mut() = card::strip_card_number(value)
            }
            Field::Card(CardField::Exp) => self.card.exp = value.to_string(),
            Field::Card(CardField::Cvc) => *self.card.cvc.expose_mut() = value.to_string(),
        }
        self.errors.clear(field);
        Ok(())
    }

    /// Dotted-key variant of [`BookingForm::edit`], e.g. `edit_key("card.exp", "12/30")`.
    pub fn edit_key(&mut self, key: &str, value: &str) -> CoreResult<()> {
        self.edit(key.parse()?, value)
    }

    pub fn set_number_of_tickets(&mut self, tickets: u32) {
        self.number_of_tickets = tickets;
        self.errors.clear(Field::NumberOfTickets);
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn customer_email(&self) -> &str {
        &self.customer_email
    }

    pub fn number_of_tickets(&self) -> u32 {
        self.number_of_tickets
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn card(&self) -> &CardDetails {
        &self.card
    }

    /// The card number as shown in the input, grouped by four.
    pub fn card_number_display(&self) -> String {
        card::format_card_number(self.card.card_no.expose())
    }

    pub fn errors(&self) -> &ValidationErrorSet {
        &self.errors
    }

    pub(crate) fn replace_errors(&mut self, errors: ValidationErrorSet) {
        self.errors = errors;
    }

    pub fn total_amount(&self, unit_price: Decimal) -> CoreResult<Decimal> {
        booking::total_amount(unit_price, self.number_of_tickets)
    }

    /// Builds the wire request. The total is derived from `event` on every call.
    pub fn to_request(&self, event: &EventListing) -> CoreResult<BookingRequest> {
        BookingRequest::for_event(
            event,
            &self.event_id,
            self.customer_name.clone(),
            self.customer_email.clone(),
            self.number_of_tickets,
            self.payment_method,
            self.card.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keys_round_trip() {
        for field in [
            Field::CustomerName,
            Field::CustomerEmail,
            Field::NumberOfTickets,
            Field::Card(CardField::Name),
            Field::Card(CardField::CardNo),
            Field::Card(CardField::Exp),
            Field::Card(CardField::Cvc),
        ] {
            assert_eq!(field.key().parse::<Field>().unwrap(), field);
        }
        assert_eq!("cardNo".parse::<Field>().unwrap(), Field::Card(CardField::CardNo));
        assert!(matches!("card.pin".parse::<Field>(), Err(CoreError::UnknownField(_))));
    }

    #[test]
    fn test_card_number_is_stored_without_separators() {
        let mut form = BookingForm::new(EventId::from("1"), 1);
        form.edit(Field::Card(CardField::CardNo), "4242 4242-4242 4242").unwrap();

        assert_eq!(form.card().card_no.expose(), "4242424242424242");
        assert_eq!(form.card_number_display(), "4242 4242 4242 4242");
    }

    #[test]
    fn test_edit_clears_only_that_fields_error() {
        let mut form = BookingForm::new(EventId::from("1"), 0);
        form.replace_errors(form.validate());
        assert!(form.errors().contains(Field::Card(CardField::Exp)));
        assert!(form.errors().contains(Field::Card(CardField::Cvc)));

        form.edit_key("card.exp", "2099-01").unwrap();

        assert!(!form.errors().contains(Field::Card(CardField::Exp)));
        assert!(form.errors().contains(Field::Card(CardField::Cvc)));
        assert!(form.errors().contains(Field::NumberOfTickets));
    }

    #[test]
    fn test_ticket_edit_rejects_non_numbers() {
        let mut form = BookingForm::new(EventId::from("1"), 2);
        assert!(form.edit(Field::NumberOfTickets, "two").is_err());
        assert_eq!(form.number_of_tickets(), 2);

        form.edit(Field::NumberOfTickets, " 4 ").unwrap();
        assert_eq!(form.number_of_tickets(), 4);
    }

    #[test]
    fn test_prefill_from_user() {
        let mut form = BookingForm::new(EventId::from("1"), 1);
        form.prefill(&UserIdentity {
            id: "u-1".to_string(),
            email: "jane@example.com".to_string(),
            name: Some("Jane Roe".to_string()),
            user_type: None,
            is_verified: true,
        });

        assert_eq!(form.customer_name(), "Jane Roe");
        assert_eq!(form.customer_email(), "jane@example.com");
        assert!(form.card().name.is_empty());
    }
}
