#![doc = include_str!("../README.md")]

pub mod claims;
pub mod error;
pub mod onboard;
pub mod token;
pub mod types;

// Re-exports for convenient access
pub use claims::PendingClaims;
pub use error::Error;
pub use token::{TokenBundle, mint_secret};
pub use types::{AccountId, FlowId, LinkageKey, Username};
