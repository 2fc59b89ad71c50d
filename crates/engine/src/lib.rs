pub mod activity;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod risk;

pub use activity::ActivityLog;
pub use config::DispatchConfig;
pub use dispatcher::OrderDispatcher;
pub use errors::DispatchError;
pub use risk::{RejectReason, RiskGate, RiskVerdict};
