//! Types for the ticket data-access layer

use crate::ledger::LedgerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Details of an event as recorded on the ticket contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Event title.
    pub title: String,
    /// Venue or location string.
    pub location: String,
    /// Event date, carried on the wire as unix seconds.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub date: DateTime<Utc>,
}

/// Read-only projection of one owned ticket.
///
/// Never cached; every enumeration re-reads the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ledger-assigned token identifier, unique per ticket contract.
    pub token_id: u64,
    /// Event the ticket admits to.
    pub event_id: u64,
    /// Details of that event.
    pub event: EventDetails,
}

/// Error types for ticket operations
#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("session is not connected")]
    NotConnected,

    #[error("purchase reverted: {0}")]
    Reverted(String),

    #[error("ledger operation failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("failed reading owned ticket at index {index}: {source}")]
    PartialReadFailure {
        index: u64,
        #[source]
        source: LedgerError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn event_date_travels_as_unix_seconds() {
        let details: EventDetails = serde_json::from_value(serde_json::json!({
            "title": "Main Stage",
            "location": "Harbor Hall",
            "date": 1735689600,
        }))
        .expect("failed to deserialize event details");

        assert_eq!(
            details.date,
            Utc.timestamp_opt(1735689600, 0).single().expect("bad date")
        );
    }
}
