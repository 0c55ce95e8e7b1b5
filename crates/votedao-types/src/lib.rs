//! VoteDAO Types - Core type definitions for the VoteDAO voting engine.
//!
//! This crate provides the fundamental types shared by the engine, the
//! RPC surface and the node:
//! - Addresses (20-byte account identities, `0x` hex encoded)
//! - Weight (18-decimal fixed-point voting power)
//! - Timestamps (Unix seconds)

pub mod address;
pub mod weight;
pub mod error;

#[cfg(feature = "serde")]
mod serialization;

pub use address::Address;
pub use weight::Weight;
pub use error::TypesError;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Address, Timestamp, TypesError, Weight};
}
