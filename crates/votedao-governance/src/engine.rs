//! The voting engine: owns the admin set, the vote table and every ballot.
//!
//! All state sits behind a single `RwLock`. Mutations hold the write lock for
//! their whole duration, including the balance-oracle read inside `vote`, so
//! no other mutation can interleave between the balance lookup and the tally
//! commit. Queries share the read lock and always see a committed state.

use crate::admin::AdminSet;
use crate::ballot::{distribute, validate_selection, Ballot};
use crate::clock::Clock;
use crate::error::{ErrorKind, GovernanceError};
use crate::oracle::BalanceOracle;
use crate::results::{TallyAudit, UserVoteResult, VoteInfo, VoteResults};
use crate::snapshot::EngineSnapshot;
use crate::vote::{validate_candidates, validate_window, Vote};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use votedao_types::{Address, Timestamp, Weight};

/// State-mutating engine operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AssignAdmin,
    RemoveAdmin,
    CreateVote,
    EditVote,
    Vote,
    RevokeVote,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::AssignAdmin,
        Operation::RemoveAdmin,
        Operation::CreateVote,
        Operation::EditVote,
        Operation::Vote,
        Operation::RevokeVote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::AssignAdmin => "assignAdmin",
            Operation::RemoveAdmin => "removeAdmin",
            Operation::CreateVote => "createVote",
            Operation::EditVote => "editVote",
            Operation::Vote => "vote",
            Operation::RevokeVote => "revokeVote",
        }
    }
}

/// Hook notified after every mutation attempt.
pub trait EngineObserver: Send + Sync {
    fn committed(&self, op: Operation);
    fn rejected(&self, op: Operation, kind: ErrorKind);
}

#[derive(Debug, Clone)]
pub(crate) struct EngineState {
    pub(crate) admins: AdminSet,
    pub(crate) votes: BTreeMap<u64, Vote>,
    /// Highest id handed out so far
    pub(crate) vote_count: u64,
}

impl EngineState {
    fn new(deployer: Address) -> Self {
        Self {
            admins: AdminSet::new(deployer),
            votes: BTreeMap::new(),
            vote_count: 0,
        }
    }

    fn vote(&self, vote_id: u64) -> Result<&Vote, GovernanceError> {
        self.votes
            .get(&vote_id)
            .ok_or_else(|| GovernanceError::vote_not_found(vote_id))
    }

    fn vote_mut(&mut self, vote_id: u64) -> Result<&mut Vote, GovernanceError> {
        self.votes
            .get_mut(&vote_id)
            .ok_or_else(|| GovernanceError::vote_not_found(vote_id))
    }
}

/// Token-weighted multi-candidate voting engine.
pub struct VotingEngine {
    state: RwLock<EngineState>,
    oracle: Arc<dyn BalanceOracle>,
    clock: Arc<dyn Clock>,
    observer: Option<Arc<dyn EngineObserver>>,
}

impl VotingEngine {
    /// Create an engine whose only admin is `deployer`.
    pub fn new(deployer: Address, oracle: Arc<dyn BalanceOracle>, clock: Arc<dyn Clock>) -> Self {
        info!("Voting engine initialized with admin {}", deployer);
        Self {
            state: RwLock::new(EngineState::new(deployer)),
            oracle,
            clock,
            observer: None,
        }
    }

    /// Rebuild an engine from a snapshot.
    pub fn restore(
        snapshot: EngineSnapshot,
        oracle: Arc<dyn BalanceOracle>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GovernanceError> {
        let state = snapshot.into_state()?;
        info!(
            "Voting engine restored: {} votes, {} admins",
            state.vote_count,
            state.admins.len()
        );
        Ok(Self {
            state: RwLock::new(state),
            oracle,
            clock,
            observer: None,
        })
    }

    /// Add bootstrap admins next to the deployer.
    pub fn with_admins(self, admins: impl IntoIterator<Item = Address>) -> Self {
        {
            let mut state = self.state.write();
            for admin in admins {
                state.admins.insert(admin);
            }
        }
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn EngineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Current time as seen by the engine.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn record<T>(&self, op: Operation, result: Result<T, GovernanceError>) -> Result<T, GovernanceError> {
        match &result {
            Ok(_) => {
                if let Some(observer) = &self.observer {
                    observer.committed(op);
                }
            }
            Err(e) => {
                debug!(operation = op.as_str(), error = %e, "Operation rejected");
                if let Some(observer) = &self.observer {
                    observer.rejected(op, e.kind());
                }
            }
        }
        result
    }

    // === Admin management ===

    /// Add `identity` to the admin set. Idempotent.
    pub fn assign_admin(&self, caller: &Address, identity: Address) -> Result<(), GovernanceError> {
        let result = (|| -> Result<(), GovernanceError> {
            let mut state = self.state.write();
            state.admins.require(caller)?;
            if state.admins.insert(identity) {
                info!(caller = %caller, admin = %identity, "Admin assigned");
            }
            Ok(())
        })();
        self.record(Operation::AssignAdmin, result)
    }

    /// Remove `identity` from the admin set.
    ///
    /// Fails with `InvalidOperation` if it is the last admin. Removing an
    /// identity that is not an admin changes nothing.
    pub fn remove_admin(&self, caller: &Address, identity: &Address) -> Result<(), GovernanceError> {
        let result = (|| -> Result<(), GovernanceError> {
            let mut state = self.state.write();
            state.admins.require(caller)?;
            if state.admins.remove(identity)? {
                info!(caller = %caller, admin = %identity, "Admin removed");
            }
            Ok(())
        })();
        self.record(Operation::RemoveAdmin, result)
    }

    // === Vote lifecycle ===

    /// Create a vote and return its id.
    ///
    /// Not idempotent: every successful call mints a new id.
    pub fn create_vote(
        &self,
        caller: &Address,
        candidates: Vec<String>,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Result<u64, GovernanceError> {
        let result = (|| -> Result<u64, GovernanceError> {
            let mut state = self.state.write();
            state.admins.require(caller)?;

            let id = state.vote_count.checked_add(1).ok_or_else(|| {
                GovernanceError::InvalidOperation("vote id space exhausted".to_string())
            })?;
            let vote = Vote::new(id, candidates, start_time, end_time, *caller, self.clock.now())?;

            info!(
                vote_id = id,
                caller = %caller,
                candidates = vote.candidates.len(),
                start_time,
                end_time,
                "Vote created"
            );
            state.votes.insert(id, vote);
            state.vote_count = id;
            Ok(id)
        })();
        self.record(Operation::CreateVote, result)
    }

    /// Edit a vote's candidates and time window.
    ///
    /// An empty `new_candidates` keeps the current list. A non-empty list
    /// replaces it, which is destructive: the tally restarts at zero and every
    /// existing ballot stops counting until its owner casts again. Editing is
    /// allowed in any phase, including after the vote has closed.
    pub fn edit_vote(
        &self,
        caller: &Address,
        vote_id: u64,
        new_candidates: Vec<String>,
        new_start_time: Timestamp,
        new_end_time: Timestamp,
    ) -> Result<(), GovernanceError> {
        let result = (|| -> Result<(), GovernanceError> {
            let mut state = self.state.write();
            state.admins.require(caller)?;
            let vote = state.vote_mut(vote_id)?;

            validate_window(new_start_time, new_end_time)?;
            let replacement = if new_candidates.is_empty() {
                None
            } else {
                Some(validate_candidates(new_candidates)?)
            };

            let replaced = replacement.is_some();
            if let Some(candidates) = replacement {
                vote.replace_candidates(candidates)?;
            }
            vote.reschedule(new_start_time, new_end_time)?;

            info!(
                vote_id,
                caller = %caller,
                candidates_replaced = replaced,
                revision = vote.revision,
                start_time = new_start_time,
                end_time = new_end_time,
                "Vote edited"
            );
            Ok(())
        })();
        self.record(Operation::EditVote, result)
    }

    // === Ballots ===

    /// Cast (or recast) `caller`'s ballot.
    ///
    /// The caller's balance is split evenly across the selection, rounding
    /// down. A previous ballot on the same vote is replaced, not added to.
    pub fn vote(&self, caller: &Address, vote_id: u64, selected: &[u32]) -> Result<(), GovernanceError> {
        let result = (|| -> Result<(), GovernanceError> {
            let mut state = self.state.write();
            let now = self.clock.now();
            let vote = state.vote_mut(vote_id)?;

            validate_selection(selected, vote.candidates.len())?;
            vote.require_open(now)?;

            let balance = self
                .oracle
                .balance_of(caller)
                .map_err(|e| GovernanceError::OracleUnavailable(e.to_string()))?;
            let per_candidate = distribute(balance, selected.len())?;

            let ballot = Ballot {
                selected: selected.to_vec(),
                candidate_names: selected
                    .iter()
                    .map(|&i| vote.candidates[i as usize].clone())
                    .collect(),
                weight_per_candidate: per_candidate,
                balance,
                revision: vote.revision,
                cast_at: now,
            };

            let replaced = vote.cast(*caller, ballot)?;
            info!(
                vote_id,
                caller = %caller,
                selections = selected.len(),
                weight_per_candidate = %per_candidate,
                replaced = replaced.is_some(),
                "Ballot cast"
            );
            Ok(())
        })();
        self.record(Operation::Vote, result)
    }

    /// Withdraw `caller`'s ballot and its contribution.
    pub fn revoke_vote(&self, caller: &Address, vote_id: u64) -> Result<(), GovernanceError> {
        let result = (|| -> Result<(), GovernanceError> {
            let mut state = self.state.write();
            let now = self.clock.now();
            let vote = state.vote_mut(vote_id)?;

            vote.require_open(now)?;
            let ballot = vote.revoke(caller)?;

            info!(
                vote_id,
                caller = %caller,
                selections = ballot.selected.len(),
                "Ballot revoked"
            );
            Ok(())
        })();
        self.record(Operation::RevokeVote, result)
    }

    // === Queries ===

    /// Highest assigned vote id (0 if none).
    pub fn vote_count(&self) -> u64 {
        self.state.read().vote_count
    }

    pub fn get_candidates(&self, vote_id: u64) -> Result<Vec<String>, GovernanceError> {
        Ok(self.state.read().vote(vote_id)?.candidates.clone())
    }

    pub fn get_vote(&self, vote_id: u64) -> Result<VoteInfo, GovernanceError> {
        let state = self.state.read();
        Ok(VoteInfo::from_vote(state.vote(vote_id)?, self.clock.now()))
    }

    pub fn get_vote_results(&self, vote_id: u64) -> Result<VoteResults, GovernanceError> {
        let state = self.state.read();
        Ok(VoteResults::from_vote(state.vote(vote_id)?, self.clock.now()))
    }

    /// `identity`'s ballot on `vote_id`; empty selections if it has none.
    pub fn get_user_vote_results(
        &self,
        vote_id: u64,
        identity: &Address,
    ) -> Result<UserVoteResult, GovernanceError> {
        let state = self.state.read();
        let vote = state.vote(vote_id)?;
        Ok(match vote.ballot(identity) {
            Some(ballot) => UserVoteResult::from_ballot(vote, ballot),
            None => UserVoteResult::empty(vote_id),
        })
    }

    /// Every live ballot held by `identity`, in ascending vote id order.
    pub fn get_all_user_vote_results(&self, identity: &Address) -> Vec<UserVoteResult> {
        let state = self.state.read();
        state
            .votes
            .values()
            .filter_map(|vote| {
                vote.ballot(identity)
                    .map(|ballot| UserVoteResult::from_ballot(vote, ballot))
            })
            .collect()
    }

    /// Whether `identity` has a live ballot on the most recent vote.
    pub fn user_currently_voted(&self, identity: &Address) -> bool {
        let state = self.state.read();
        state
            .votes
            .get(&state.vote_count)
            .map(|vote| vote.ballot(identity).is_some())
            .unwrap_or(false)
    }

    pub fn is_admin(&self, identity: &Address) -> bool {
        self.state.read().admins.contains(identity)
    }

    /// Admins in ascending address order.
    pub fn admins(&self) -> Vec<Address> {
        self.state.read().admins.members()
    }

    /// Weight `identity` would deliver to each of `count` candidates if it cast now.
    pub fn preview_distribution(&self, identity: &Address, count: usize) -> Result<Weight, GovernanceError> {
        let balance = self
            .oracle
            .balance_of(identity)
            .map_err(|e| GovernanceError::OracleUnavailable(e.to_string()))?;
        distribute(balance, count)
    }

    /// Compare the stored tally of `vote_id` with one rebuilt from its ballots.
    pub fn audit_tally(&self, vote_id: u64) -> Result<TallyAudit, GovernanceError> {
        Ok(TallyAudit::of(self.state.read().vote(vote_id)?))
    }

    // === Persistence ===

    /// Consistent copy of the whole engine state.
    pub fn snapshot(&self) -> EngineSnapshot {
        let state = self.state.read();
        EngineSnapshot::from_state(&state, self.clock.now())
    }
}

impl std::fmt::Debug for VotingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("VotingEngine")
            .field("vote_count", &state.vote_count)
            .field("admins", &state.admins.len())
            .finish()
    }
}
