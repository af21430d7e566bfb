//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based chain client for ERC-721 reads and transfers
//! - Encrypted keystore for wallet accounts
//! - Tokio runtime bridge for async operations

pub mod ethereum;
pub mod keystore;
pub mod metadata;
pub mod runtime;

pub use runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent, WorkerSettings};
