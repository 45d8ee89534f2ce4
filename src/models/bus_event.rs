use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::event::{BusMessage, StoredBusEvent};
use crate::models::decode_json;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::bus_events)]
pub struct BusEvent {
    pub id: i32,
    pub channel: String,
    pub event: String,
    pub payload: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::bus_events)]
pub struct NewBusEvent<'a> {
    pub channel: &'a str,
    pub event: &'a str,
    pub payload: String,
}

impl From<BusEvent> for StoredBusEvent {
    fn from(value: BusEvent) -> Self {
        Self {
            id: value.id,
            message: BusMessage {
                event: value.event,
                data: decode_json(&value.payload, "bus_events.payload"),
            },
            channel: value.channel,
            created_at: value.created_at,
        }
    }
}
