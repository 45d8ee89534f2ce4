use diesel::prelude::*;
use pushkind_common::repository::errors::RepositoryResult;

use crate::{
    domain::event::{BusMessage, StoredBusEvent},
    models::bus_event::{BusEvent, NewBusEvent},
    repository::{DieselRepository, EventStore},
};

impl EventStore for DieselRepository {
    fn append_bus_event(&self, channel: &str, message: &BusMessage) -> RepositoryResult<()> {
        use crate::schema::bus_events;

        let mut conn = self.conn()?;
        let payload = serde_json::to_string(&message.data).unwrap_or_else(|err| {
            log::error!("Failed to encode bus event {}: {err}", message.event);
            "null".to_string()
        });
        let new_event = NewBusEvent {
            channel,
            event: message.event.as_str(),
            payload,
        };

        diesel::insert_into(bus_events::table)
            .values(&new_event)
            .execute(&mut conn)?;

        Ok(())
    }

    fn list_bus_events(&self, after_id: i32, limit: i64) -> RepositoryResult<Vec<StoredBusEvent>> {
        use crate::schema::bus_events;

        let mut conn = self.conn()?;
        let events = bus_events::table
            .filter(bus_events::id.gt(after_id))
            .order(bus_events::id.asc())
            .limit(limit)
            .load::<BusEvent>(&mut conn)?;

        Ok(events.into_iter().map(Into::into).collect())
    }
}
