use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage format for message timestamps (UTC, no offset suffix).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A customer message as shown to agents.
///
/// `user_id` is the customer's external id. Customers are not agents and do
/// not have a row in the user table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub user_id: i64,
    pub timestamp: String,
    pub message_body: String,
    pub response: Option<String>,
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Current UTC time in [`TIMESTAMP_FORMAT`].
pub fn utc_timestamp() -> String {
    format_timestamp(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_without_offset() {
        let at = Utc.with_ymd_and_hms(2017, 2, 1, 19, 29, 27).unwrap();
        assert_eq!(format_timestamp(at), "2017-02-01 19:29:27");
    }

    #[test]
    fn now_round_trips_through_format() {
        let now = utc_timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&now, TIMESTAMP_FORMAT).is_ok());
    }
}
