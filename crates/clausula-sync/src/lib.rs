//! Ingestion layer: pulls contract and addition records from the contract management API.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{ContractClient, SyncError};
