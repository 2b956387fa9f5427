//! Feature modules
//!
//! - submit: drives one contract write through the wallet
//! - export: writes the session history to CSV + JSON

pub mod export;
pub mod submit;
