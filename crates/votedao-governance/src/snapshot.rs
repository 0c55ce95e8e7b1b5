//! Engine snapshots for persistence across restarts.

use crate::admin::AdminSet;
use crate::ballot::{distribute, validate_selection};
use crate::engine::EngineState;
use crate::error::GovernanceError;
use crate::results::TallyAudit;
use crate::vote::{validate_candidates, validate_window, Vote};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use votedao_types::{Address, Timestamp};

/// Full, self-contained copy of the engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Encoding version
    pub format_version: u32,
    /// Admins, ascending
    pub admins: Vec<Address>,
    /// Highest vote id handed out
    pub vote_count: u64,
    /// Votes in ascending id order, ballots included
    pub votes: Vec<Vote>,
    /// Engine time when the snapshot was taken
    pub taken_at: Timestamp,
}

impl EngineSnapshot {
    pub const FORMAT_VERSION: u32 = 1;

    pub(crate) fn from_state(state: &EngineState, taken_at: Timestamp) -> Self {
        Self {
            format_version: Self::FORMAT_VERSION,
            admins: state.admins.members(),
            vote_count: state.vote_count,
            votes: state.votes.values().cloned().collect(),
            taken_at,
        }
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(self).map_err(|e| GovernanceError::Snapshot(e.to_string()))
    }

    /// Decode with bincode. Structural checks happen on restore.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GovernanceError> {
        bincode::deserialize(bytes).map_err(|e| GovernanceError::Snapshot(e.to_string()))
    }

    /// Validate and convert into live engine state.
    pub(crate) fn into_state(self) -> Result<EngineState, GovernanceError> {
        if self.format_version != Self::FORMAT_VERSION {
            return Err(GovernanceError::Snapshot(format!(
                "unsupported format version {} (expected {})",
                self.format_version,
                Self::FORMAT_VERSION
            )));
        }

        let admins = AdminSet::from_members(self.admins)
            .map_err(|_| GovernanceError::Snapshot("snapshot has no admins".to_string()))?;

        if self.votes.len() as u64 != self.vote_count {
            return Err(GovernanceError::Snapshot(format!(
                "vote count {} does not match {} stored votes",
                self.vote_count,
                self.votes.len()
            )));
        }

        let mut votes = BTreeMap::new();
        for (position, vote) in self.votes.into_iter().enumerate() {
            let expected_id = position as u64 + 1;
            if vote.id != expected_id {
                return Err(GovernanceError::Snapshot(format!(
                    "vote at position {} has id {}, expected {}",
                    position, vote.id, expected_id
                )));
            }
            check_vote(&vote)?;
            votes.insert(vote.id, vote);
        }

        Ok(EngineState {
            admins,
            votes,
            vote_count: self.vote_count,
        })
    }
}

fn check_vote(vote: &Vote) -> Result<(), GovernanceError> {
    let corrupt = |what: String| GovernanceError::Snapshot(format!("vote {}: {}", vote.id, what));

    let normalized = validate_candidates(vote.candidates.clone()).map_err(|e| corrupt(e.to_string()))?;
    if normalized != vote.candidates {
        return Err(corrupt("candidate names are not normalized".to_string()));
    }
    validate_window(vote.start_time, vote.end_time).map_err(|e| corrupt(e.to_string()))?;

    if vote.tally.len() != vote.candidates.len() {
        return Err(corrupt(format!(
            "{} tally entries for {} candidates",
            vote.tally.len(),
            vote.candidates.len()
        )));
    }

    for (voter, ballot) in vote.ballots() {
        if ballot.revision > vote.revision {
            return Err(corrupt(format!("ballot of {} is from a future revision", voter)));
        }
        if ballot.selected.len() != ballot.candidate_names.len() {
            return Err(corrupt(format!("ballot of {} has mismatched names", voter)));
        }
        if ballot.is_stale(vote.revision) {
            continue;
        }
        validate_selection(&ballot.selected, vote.candidates.len())
            .map_err(|e| corrupt(format!("ballot of {}: {}", voter, e)))?;
        let expected = distribute(ballot.balance, ballot.selected.len())
            .map_err(|e| corrupt(format!("ballot of {}: {}", voter, e)))?;
        if ballot.weight_per_candidate != expected {
            return Err(corrupt(format!(
                "ballot of {} carries {} per candidate, balance {} splits to {}",
                voter, ballot.weight_per_candidate, ballot.balance, expected
            )));
        }
    }

    if !TallyAudit::of(vote).is_consistent() {
        return Err(corrupt("stored tally disagrees with ballots".to_string()));
    }
    Ok(())
}
