use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
    Failed,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Pending => "PENDING",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Status values accepted by the status-update endpoint (lower case on the wire).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusUpdate {
    Confirmed,
    Cancelled,
    Pending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&BookingStatus::Confirmed).unwrap(), "\"CONFIRMED\"");
        assert_eq!(serde_json::to_string(&StatusUpdate::Cancelled).unwrap(), "\"cancelled\"");

        let status: BookingStatus = serde_json::from_str("\"FAILED\"").unwrap();
        assert_eq!(status, BookingStatus::Failed);
        assert_eq!(status.to_string(), "FAILED");
    }
}
