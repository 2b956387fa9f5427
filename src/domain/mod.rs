//! Domain layer
//!
//! Pure types with no I/O:
//! - contract: function selectors and their ABI descriptors
//! - submission: the submission state machine and error taxonomy

pub mod contract;
pub mod submission;
