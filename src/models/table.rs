use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::table::{DiningTable as DomainDiningTable, NewDiningTable as DomainNewDiningTable};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::dining_tables)]
pub struct DiningTable {
    pub id: i32,
    pub hub_id: i32,
    pub number: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::dining_tables)]
pub struct NewDiningTable<'a> {
    pub hub_id: i32,
    pub number: &'a str,
}

impl From<DiningTable> for DomainDiningTable {
    fn from(value: DiningTable) -> Self {
        Self {
            id: value.id,
            hub_id: value.hub_id,
            number: value.number,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewDiningTable> for NewDiningTable<'a> {
    fn from(value: &'a DomainNewDiningTable) -> Self {
        Self {
            hub_id: value.hub_id,
            number: value.number.as_str(),
        }
    }
}
