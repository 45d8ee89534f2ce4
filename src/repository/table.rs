use diesel::prelude::*;
use pushkind_common::repository::errors::RepositoryResult;

use crate::{
    domain::table::{DiningTable as DomainDiningTable, NewDiningTable as DomainNewDiningTable},
    models::table::{DiningTable as DbDiningTable, NewDiningTable as DbNewDiningTable},
    repository::{DieselRepository, TableReader, TableWriter},
};

impl TableReader for DieselRepository {
    fn get_table_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<DomainDiningTable>> {
        use crate::schema::dining_tables;

        let mut conn = self.conn()?;
        let table = dining_tables::table
            .filter(dining_tables::id.eq(id))
            .filter(dining_tables::hub_id.eq(hub_id))
            .first::<DbDiningTable>(&mut conn)
            .optional()?;

        Ok(table.map(Into::into))
    }
}

impl TableWriter for DieselRepository {
    fn create_table(&self, new_table: &DomainNewDiningTable) -> RepositoryResult<DomainDiningTable> {
        use crate::schema::dining_tables;

        let mut conn = self.conn()?;
        let db_new = DbNewDiningTable::from(new_table);

        let created = diesel::insert_into(dining_tables::table)
            .values(&db_new)
            .get_result::<DbDiningTable>(&mut conn)?;

        Ok(created.into())
    }
}
