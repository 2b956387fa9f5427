//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based wallet (signer + provider) behind the `WalletClient` trait
//! - Tokio runtime bridge for async operations

pub mod runtime;
pub mod wallet;
