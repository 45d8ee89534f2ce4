use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Bill state changes announced to table and staff screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillEvent {
    Created,
    Updated,
    Finalized,
    Paid,
    Reopened,
}

impl BillEvent {
    /// Wire name of the event.
    pub fn name(self) -> &'static str {
        match self {
            BillEvent::Created => "billCreated",
            BillEvent::Updated => "billUpdated",
            BillEvent::Finalized => "billFinalized",
            BillEvent::Paid => "billPaid",
            BillEvent::Reopened => "billReopened",
        }
    }
}

/// Message published on a bus channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub event: String,
    pub data: serde_json::Value,
}

/// Message persisted by the outbox publisher.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBusEvent {
    pub id: i32,
    pub channel: String,
    pub message: BusMessage,
    pub created_at: NaiveDateTime,
}

/// Channel carrying events for a hub, narrowed to a table when known.
pub fn channel_for(hub_id: i32, table_id: Option<i32>) -> String {
    match table_id {
        Some(table_id) => format!("restaurant:{hub_id}:table:{table_id}"),
        None => format!("restaurant:{hub_id}"),
    }
}

/// Message together with the channel it was published on.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMessage {
    pub channel: String,
    pub message: BusMessage,
}
