// totalconnect-api: Async Rust client for the Total Connect 2 alarm panel
// service (REST + legacy XML generations)

pub mod auth;
pub mod error;
pub mod legacy;
pub mod rest;
pub mod state;
pub mod transport;

pub use auth::{BearerToken, Credentials, ProtocolGeneration};
pub use error::Error;
pub use legacy::LegacyClient;
pub use rest::RestClient;
pub use state::{ArmTarget, ArmingState, ResultCode};
pub use transport::{TlsMode, TransportConfig};
