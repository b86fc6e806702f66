// emberlink-api: Async Rust client for the Emberlink cloud thermometer API

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::CloudClient;
pub use error::Error;
pub use transport::TransportConfig;
pub use types::{RawChannel, RawDevice, RawUser};
