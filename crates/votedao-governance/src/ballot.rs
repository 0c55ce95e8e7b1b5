//! Ballots: one identity's current selection on one vote.

use crate::error::GovernanceError;
use crate::vote::MAX_SELECTIONS;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use votedao_types::{Timestamp, Weight};

/// A live ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    /// Selected candidate indices, in the order they were submitted
    pub selected: Vec<u32>,
    /// Candidate names at those indices when the ballot was cast
    pub candidate_names: Vec<String>,
    /// Weight delivered to each selected candidate
    pub weight_per_candidate: Weight,
    /// Caller's balance at cast time
    pub balance: Weight,
    /// Candidate-list revision the ballot was cast against
    pub revision: u32,
    /// When the ballot was cast
    pub cast_at: Timestamp,
}

impl Ballot {
    /// Weight this ballot adds to each selected candidate under `current_revision`.
    ///
    /// Ballots cast against an earlier candidate list contribute nothing.
    pub fn effective_weight(&self, current_revision: u32) -> Weight {
        if self.revision == current_revision {
            self.weight_per_candidate
        } else {
            Weight::ZERO
        }
    }

    pub fn is_stale(&self, current_revision: u32) -> bool {
        self.revision != current_revision
    }
}

/// Validate a selection against a candidate list of `candidate_count` entries.
///
/// Requires 1 to [`MAX_SELECTIONS`] distinct, in-range indices.
pub fn validate_selection(selected: &[u32], candidate_count: usize) -> Result<(), GovernanceError> {
    if selected.is_empty() {
        return Err(GovernanceError::InvalidArgument(
            "at least one candidate must be selected".to_string(),
        ));
    }
    if selected.len() > MAX_SELECTIONS {
        return Err(GovernanceError::InvalidArgument(format!(
            "at most {} candidates may be selected, got {}",
            MAX_SELECTIONS,
            selected.len()
        )));
    }

    let mut seen = HashSet::with_capacity(selected.len());
    for &index in selected {
        if index as usize >= candidate_count {
            return Err(GovernanceError::InvalidArgument(format!(
                "candidate index {} out of range (vote has {} candidates)",
                index, candidate_count
            )));
        }
        if !seen.insert(index) {
            return Err(GovernanceError::InvalidArgument(format!(
                "candidate index {} selected more than once",
                index
            )));
        }
    }
    Ok(())
}

/// Per-candidate share of `balance` when split across `selections` candidates.
pub fn distribute(balance: Weight, selections: usize) -> Result<Weight, GovernanceError> {
    if selections == 0 || selections > MAX_SELECTIONS {
        return Err(GovernanceError::InvalidArgument(format!(
            "selection count must be between 1 and {}, got {}",
            MAX_SELECTIONS, selections
        )));
    }
    balance.split_floor(selections).ok_or_else(|| {
        GovernanceError::InvalidArgument("selection count must be positive".to_string())
    })
}
