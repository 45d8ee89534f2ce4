pub use pushkind_common::services::errors::{ServiceError, ServiceResult};

pub mod bills;
pub mod orders;
pub mod pricing;
pub mod sync;
pub mod totals;
