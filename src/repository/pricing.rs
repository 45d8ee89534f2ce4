use diesel::prelude::*;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::pricing::{
        NewPricingConfig as DomainNewPricingConfig, PricingConfig as DomainPricingConfig,
        TenantSettings as DomainTenantSettings,
    },
    models::pricing::{
        NewPricingConfig as DbNewPricingConfig, PricingConfig as DbPricingConfig,
        TenantSettings as DbTenantSettings,
    },
    repository::{DieselRepository, PricingReader, PricingWriter},
};

impl PricingReader for DieselRepository {
    fn list_pricing_configs(&self, hub_id: i32) -> RepositoryResult<Vec<DomainPricingConfig>> {
        use crate::schema::pricing_configs;

        let mut conn = self.conn()?;
        let configs = pricing_configs::table
            .filter(pricing_configs::hub_id.eq(hub_id))
            .order(pricing_configs::id.asc())
            .load::<DbPricingConfig>(&mut conn)?;

        Ok(configs.into_iter().map(Into::into).collect())
    }

    fn get_tenant_settings(&self, hub_id: i32) -> RepositoryResult<Option<DomainTenantSettings>> {
        use crate::schema::tenant_settings;

        let mut conn = self.conn()?;
        let settings = tenant_settings::table
            .filter(tenant_settings::hub_id.eq(hub_id))
            .first::<DbTenantSettings>(&mut conn)
            .optional()?;

        Ok(settings.map(Into::into))
    }
}

impl PricingWriter for DieselRepository {
    fn create_pricing_config(
        &self,
        new_config: &DomainNewPricingConfig,
    ) -> RepositoryResult<DomainPricingConfig> {
        use crate::schema::pricing_configs;

        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainPricingConfig, RepositoryError, _>(|conn| {
            let latest = pricing_configs::table
                .filter(pricing_configs::hub_id.eq(new_config.hub_id))
                .select(diesel::dsl::max(pricing_configs::version))
                .first::<Option<i32>>(conn)?;

            if new_config.activate {
                diesel::update(
                    pricing_configs::table.filter(pricing_configs::hub_id.eq(new_config.hub_id)),
                )
                .set(pricing_configs::active.eq(false))
                .execute(conn)?;
            }

            let db_new = DbNewPricingConfig::from_domain(new_config, latest.unwrap_or(0) + 1);

            let created = diesel::insert_into(pricing_configs::table)
                .values(&db_new)
                .get_result::<DbPricingConfig>(conn)?;

            Ok(created.into())
        })
    }

    fn activate_pricing_config(
        &self,
        config_id: i32,
        hub_id: i32,
    ) -> RepositoryResult<DomainPricingConfig> {
        use crate::schema::pricing_configs;

        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainPricingConfig, RepositoryError, _>(|conn| {
            let exists = pricing_configs::table
                .filter(pricing_configs::id.eq(config_id))
                .filter(pricing_configs::hub_id.eq(hub_id))
                .select(pricing_configs::id)
                .first::<i32>(conn)
                .optional()?;

            if exists.is_none() {
                return Err(RepositoryError::NotFound);
            }

            diesel::update(pricing_configs::table.filter(pricing_configs::hub_id.eq(hub_id)))
                .set(pricing_configs::active.eq(false))
                .execute(conn)?;

            let activated = diesel::update(pricing_configs::table.find(config_id))
                .set(pricing_configs::active.eq(true))
                .get_result::<DbPricingConfig>(conn)?;

            Ok(activated.into())
        })
    }

    fn save_tenant_settings(
        &self,
        settings: &DomainTenantSettings,
    ) -> RepositoryResult<DomainTenantSettings> {
        use crate::schema::tenant_settings;

        let mut conn = self.conn()?;
        let row = DbTenantSettings::from(settings);

        let saved = diesel::insert_into(tenant_settings::table)
            .values(&row)
            .on_conflict(tenant_settings::hub_id)
            .do_update()
            .set(&row)
            .get_result::<DbTenantSettings>(&mut conn)?;

        Ok(saved.into())
    }
}
