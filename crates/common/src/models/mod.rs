pub mod account;
pub mod activity;
pub mod bar;
pub mod notification;
pub mod order;
pub mod position;
pub mod signal;

pub use account::AccountSnapshot;
pub use activity::{LogEntry, Outcome};
pub use bar::Bar;
pub use notification::{Notification, Severity};
pub use order::{OrderReceipt, OrderRequest, OrderSide, OrderType, TimeInForce};
pub use position::Position;
pub use signal::{Signal, SignalAction, SymbolSignal};
