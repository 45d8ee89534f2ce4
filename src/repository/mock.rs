use mockall::mock;

use super::{
    BillReader, BillWriter, OrderReader, PricingReader, PricingWriter, TableReader,
};
use crate::domain::{
    bill::{Bill, BillInsert, BillListQuery, BillSave, NewBill},
    order::{Order, OrderListQuery, OrderMirror},
    pricing::{NewPricingConfig, PricingConfig, TenantSettings},
    table::DiningTable,
};
use pushkind_common::repository::errors::RepositoryResult;

mock! {
    pub PricingReader {}

    impl PricingReader for PricingReader {
        fn list_pricing_configs(&self, hub_id: i32) -> RepositoryResult<Vec<PricingConfig>>;
        fn get_tenant_settings(&self, hub_id: i32) -> RepositoryResult<Option<TenantSettings>>;
    }
}

mock! {
    pub PricingWriter {}

    impl PricingWriter for PricingWriter {
        fn create_pricing_config(&self, new_config: &NewPricingConfig) -> RepositoryResult<PricingConfig>;
        fn activate_pricing_config(&self, config_id: i32, hub_id: i32) -> RepositoryResult<PricingConfig>;
        fn save_tenant_settings(&self, settings: &TenantSettings) -> RepositoryResult<TenantSettings>;
    }
}

mock! {
    pub OrderReader {}

    impl OrderReader for OrderReader {
        fn get_order_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<Order>>;
        fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
    }
}

mock! {
    pub BillReader {}

    impl BillReader for BillReader {
        fn get_bill_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<Bill>>;
        fn find_active_bill_for_order(&self, hub_id: i32, order_id: i32) -> RepositoryResult<Option<Bill>>;
        fn find_active_bill_for_session(&self, hub_id: i32, session_id: &str) -> RepositoryResult<Option<Bill>>;
        fn list_bills(&self, query: BillListQuery) -> RepositoryResult<(usize, Vec<Bill>)>;
    }
}

mock! {
    /// Every repository surface the bill lifecycle touches.
    pub BillingRepository {}

    impl OrderReader for BillingRepository {
        fn get_order_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<Order>>;
        fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
    }

    impl TableReader for BillingRepository {
        fn get_table_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<DiningTable>>;
    }

    impl PricingReader for BillingRepository {
        fn list_pricing_configs(&self, hub_id: i32) -> RepositoryResult<Vec<PricingConfig>>;
        fn get_tenant_settings(&self, hub_id: i32) -> RepositoryResult<Option<TenantSettings>>;
    }

    impl BillReader for BillingRepository {
        fn get_bill_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<Bill>>;
        fn find_active_bill_for_order(&self, hub_id: i32, order_id: i32) -> RepositoryResult<Option<Bill>>;
        fn find_active_bill_for_session(&self, hub_id: i32, session_id: &str) -> RepositoryResult<Option<Bill>>;
        fn list_bills(&self, query: BillListQuery) -> RepositoryResult<(usize, Vec<Bill>)>;
    }

    impl BillWriter for BillingRepository {
        fn insert_bill_if_absent(&self, new_bill: &NewBill) -> RepositoryResult<BillInsert>;
        fn save_bill<'a>(&self, bill: &Bill, mirror: Option<&'a OrderMirror>) -> RepositoryResult<BillSave>;
    }
}
