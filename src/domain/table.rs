use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Dining table registered for a hub.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: i32,
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Number shown to guests and staff.
    pub number: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload required to register a table.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDiningTable {
    pub hub_id: i32,
    pub number: String,
}

impl NewDiningTable {
    /// Construct a new table payload with a trimmed number.
    pub fn new(hub_id: i32, number: impl Into<String>) -> Self {
        let number = number.into().trim().to_string();
        Self { hub_id, number }
    }
}
