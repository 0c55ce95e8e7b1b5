//! VoteDAO RPC - JSON-RPC 2.0 access to the voting engine.
//!
//! Exposes every engine operation as a `dao_` method over HTTP.

pub mod api;
pub mod error;
pub mod server;

pub use api::{parse_address, DaoApiServer, DaoRpc};
pub use error::{error_codes, RpcError};
pub use server::{RpcServer, RpcServerConfig};
