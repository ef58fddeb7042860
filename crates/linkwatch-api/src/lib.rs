// linkwatch-api: Async HTTP client for a wireless device's status page

pub mod error;
pub mod status;
pub mod transport;

pub use error::Error;
pub use status::StatusClient;
pub use transport::TransportConfig;
