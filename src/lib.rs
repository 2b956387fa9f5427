//! arcpoke: a terminal faucet for Arc Testnet contracts.
//!
//! Connect a wallet, pick one of `gm`, `faucet`, `drip`, `claim` or
//! `setGreeting(string)`, send it and follow the transaction until it is
//! mined.

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod modules;
pub mod ui;
