//! Votes: governance rounds with a candidate list, a time window and a tally.
//!
//! A vote moves through phases derived from the clock, never stored:
//! Pending (`now < start`) -> Open (`start <= now < end`) -> Closed (`now >= end`).

use crate::ballot::Ballot;
use crate::error::GovernanceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use votedao_types::{Address, Timestamp, Weight};

/// Maximum number of candidates on one vote.
pub const MAX_CANDIDATES: usize = 20;

/// Maximum number of candidates one ballot may select.
pub const MAX_SELECTIONS: usize = 10;

/// Vote phase at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotePhase {
    /// Voting has not started
    Pending,
    /// Ballots may be cast and revoked
    Open,
    /// Voting has ended
    Closed,
}

impl VotePhase {
    pub fn is_open(&self) -> bool {
        matches!(self, VotePhase::Open)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VotePhase::Pending => "pending",
            VotePhase::Open => "open",
            VotePhase::Closed => "closed",
        }
    }
}

/// One governance round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Sequential id, starting at 1
    pub id: u64,
    /// Candidate names; the index is the candidate's identity for casting
    pub candidates: Vec<String>,
    /// Voting opens at this time (inclusive)
    pub start_time: Timestamp,
    /// Voting closes at this time (exclusive)
    pub end_time: Timestamp,
    /// Accumulated weight per candidate index
    pub tally: Vec<Weight>,
    /// Bumped every time the candidate list is replaced
    pub revision: u32,
    /// Admin that created the vote
    pub created_by: Address,
    /// Creation time
    pub created_at: Timestamp,
    /// Live ballots by voter
    ballots: BTreeMap<Address, Ballot>,
}

impl Vote {
    /// Create a vote after validating candidates and time window.
    pub fn new(
        id: u64,
        candidates: Vec<String>,
        start_time: Timestamp,
        end_time: Timestamp,
        created_by: Address,
        created_at: Timestamp,
    ) -> Result<Self, GovernanceError> {
        let candidates = validate_candidates(candidates)?;
        validate_window(start_time, end_time)?;

        Ok(Self {
            id,
            tally: vec![Weight::ZERO; candidates.len()],
            candidates,
            start_time,
            end_time,
            revision: 0,
            created_by,
            created_at,
            ballots: BTreeMap::new(),
        })
    }

    /// Phase of this vote at time `now`.
    pub fn phase_at(&self, now: Timestamp) -> VotePhase {
        if now < self.start_time {
            VotePhase::Pending
        } else if now < self.end_time {
            VotePhase::Open
        } else {
            VotePhase::Closed
        }
    }

    /// Fail with `InvalidState` unless the vote is open at `now`.
    pub fn require_open(&self, now: Timestamp) -> Result<(), GovernanceError> {
        let phase = self.phase_at(now);
        if phase.is_open() {
            Ok(())
        } else {
            Err(GovernanceError::InvalidState(format!(
                "vote {} is {} (window {}..{}, now {})",
                self.id,
                phase.as_str(),
                self.start_time,
                self.end_time,
                now
            )))
        }
    }

    pub fn ballot(&self, voter: &Address) -> Option<&Ballot> {
        self.ballots.get(voter)
    }

    pub fn ballots(&self) -> impl Iterator<Item = (&Address, &Ballot)> {
        self.ballots.iter()
    }

    pub fn ballot_count(&self) -> usize {
        self.ballots.len()
    }

    /// Move the voting window.
    pub(crate) fn reschedule(
        &mut self,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Result<(), GovernanceError> {
        validate_window(start_time, end_time)?;
        self.start_time = start_time;
        self.end_time = end_time;
        Ok(())
    }

    /// Replace the candidate list.
    ///
    /// Indices change meaning, so the tally restarts at zero and every existing
    /// ballot becomes stale (kept, but contributing nothing).
    pub(crate) fn replace_candidates(&mut self, candidates: Vec<String>) -> Result<(), GovernanceError> {
        let candidates = validate_candidates(candidates)?;
        self.revision = self.revision.checked_add(1).ok_or_else(|| {
            GovernanceError::InvalidOperation(format!("vote {} revision overflow", self.id))
        })?;
        self.tally = vec![Weight::ZERO; candidates.len()];
        self.candidates = candidates;
        Ok(())
    }

    /// Store `ballot` for `voter`, replacing any previous ballot.
    ///
    /// The previous ballot's contribution is removed and the new one added in a
    /// scratch tally that only replaces the stored one if both steps succeed.
    pub(crate) fn cast(&mut self, voter: Address, ballot: Ballot) -> Result<Option<Ballot>, GovernanceError> {
        let mut next = self.tally.clone();

        if let Some(previous) = self.ballots.get(&voter) {
            self.withdraw_from(&mut next, previous)?;
        }

        let weight = ballot.effective_weight(self.revision);
        for &index in &ballot.selected {
            let slot = next.get_mut(index as usize).ok_or_else(|| {
                GovernanceError::InvalidArgument(format!("candidate index {} out of range", index))
            })?;
            *slot = slot.checked_add(weight).ok_or_else(|| {
                GovernanceError::InvalidOperation(format!("tally overflow on vote {}", self.id))
            })?;
        }

        self.tally = next;
        Ok(self.ballots.insert(voter, ballot))
    }

    /// Remove `voter`'s ballot and its contribution.
    pub(crate) fn revoke(&mut self, voter: &Address) -> Result<Ballot, GovernanceError> {
        let previous = self.ballots.get(voter).ok_or_else(|| {
            GovernanceError::NotFound(format!("{} has no ballot on vote {}", voter, self.id))
        })?;

        let mut next = self.tally.clone();
        self.withdraw_from(&mut next, previous)?;
        self.tally = next;

        self.ballots.remove(voter).ok_or_else(|| {
            GovernanceError::NotFound(format!("{} has no ballot on vote {}", voter, self.id))
        })
    }

    fn withdraw_from(&self, tally: &mut [Weight], ballot: &Ballot) -> Result<(), GovernanceError> {
        let weight = ballot.effective_weight(self.revision);
        if weight.is_zero() {
            return Ok(());
        }
        for &index in &ballot.selected {
            let slot = tally.get_mut(index as usize).ok_or_else(|| {
                GovernanceError::InvalidOperation(format!(
                    "ballot references missing candidate {} on vote {}",
                    index, self.id
                ))
            })?;
            *slot = slot.checked_sub(weight).ok_or_else(|| {
                GovernanceError::InvalidOperation(format!("tally underflow on vote {}", self.id))
            })?;
        }
        Ok(())
    }

    /// Tally rebuilt from the live ballots.
    pub fn recompute_tally(&self) -> Vec<Weight> {
        let mut tally = vec![Weight::ZERO; self.candidates.len()];
        for ballot in self.ballots.values() {
            let weight = ballot.effective_weight(self.revision);
            for &index in &ballot.selected {
                if let Some(slot) = tally.get_mut(index as usize) {
                    *slot = Weight::from_raw(slot.raw().saturating_add(weight.raw()));
                }
            }
        }
        tally
    }
}

/// Trim and validate a candidate list: 1 to [`MAX_CANDIDATES`] non-blank names.
pub fn validate_candidates(candidates: Vec<String>) -> Result<Vec<String>, GovernanceError> {
    if candidates.is_empty() {
        return Err(GovernanceError::InvalidArgument(
            "candidate list cannot be empty".to_string(),
        ));
    }
    if candidates.len() > MAX_CANDIDATES {
        return Err(GovernanceError::InvalidArgument(format!(
            "at most {} candidates allowed, got {}",
            MAX_CANDIDATES,
            candidates.len()
        )));
    }

    candidates
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                Err(GovernanceError::InvalidArgument(format!(
                    "candidate {} has an empty name",
                    i
                )))
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}

/// Require `start_time < end_time`.
pub fn validate_window(start_time: Timestamp, end_time: Timestamp) -> Result<(), GovernanceError> {
    if start_time >= end_time {
        return Err(GovernanceError::InvalidArgument(format!(
            "start time {} must be before end time {}",
            start_time, end_time
        )));
    }
    Ok(())
}
