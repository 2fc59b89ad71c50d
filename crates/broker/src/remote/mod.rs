pub mod account_response;
pub mod alpaca_client;
pub mod bar_response;
pub mod order_response;
pub mod position_response;
pub mod trade_response;

pub use alpaca_client::AlpacaClient;
