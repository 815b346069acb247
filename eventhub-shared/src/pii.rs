use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wrapper for cardholder data and other secrets.
///
/// `Debug` and `Display` never print the value, so a `tracing::info!("{:?}", request)`
/// cannot leak a card number. Serialization passes the real value through because the
/// booking backend needs it on the wire.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(T);

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn expose_mut(&mut self) -> &mut T {
        &mut self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Masked<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_value() {
        let cvc = Masked::new("123".to_string());
        assert_eq!(format!("{:?}", cvc), "********");
        assert_eq!(cvc.to_string(), "********");
        assert_eq!(cvc.expose(), "123");
    }

    #[test]
    fn test_serialization_is_transparent() {
        let cvc: Masked<String> = serde_json::from_str("\"4242\"").unwrap();
        assert_eq!(serde_json::to_string(&cvc).unwrap(), "\"4242\"");
    }
}
