//! Application use cases. Orchestrate domain logic via ports.

pub mod dispatcher;
pub mod finance_service;

pub use dispatcher::CommandDispatcher;
pub use finance_service::FinanceService;
