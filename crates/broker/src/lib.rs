pub mod remote;
pub mod traits;

pub use remote::alpaca_client::AlpacaClient;
pub use traits::BrokerClient;
