pub mod bill;
pub mod event;
pub mod money;
pub mod order;
pub mod pricing;
pub mod table;
