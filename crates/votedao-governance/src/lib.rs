//! VoteDAO Governance - token-weighted, multi-candidate voting engine.
//!
//! This crate provides:
//! - Admin set management (never left empty)
//! - Vote lifecycle (create, edit, time-derived phases)
//! - Ballot casting with even, floor-rounded weight distribution
//! - Ballot revocation and replace-on-recast tally updates
//! - Read-only result projections and per-identity history
//! - Engine snapshots for persistence

pub mod admin;
pub mod ballot;
pub mod clock;
pub mod engine;
pub mod error;
pub mod oracle;
pub mod results;
pub mod snapshot;
pub mod vote;

pub use admin::AdminSet;
pub use ballot::Ballot;
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{EngineObserver, Operation, VotingEngine};
pub use error::{ErrorKind, GovernanceError};
pub use oracle::{BalanceOracle, OracleError, StaticBalances};
pub use results::{CandidateTally, TallyAudit, UserVoteResult, VoteInfo, VoteResults};
pub use snapshot::EngineSnapshot;
pub use vote::{Vote, VotePhase, MAX_CANDIDATES, MAX_SELECTIONS};
