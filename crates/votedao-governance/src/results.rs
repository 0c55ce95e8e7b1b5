//! Read-only projections returned by engine queries.

use crate::ballot::Ballot;
use crate::vote::{Vote, VotePhase};
use serde::{Deserialize, Serialize};
use votedao_types::{Address, Timestamp, Weight};

/// One candidate and the weight attributed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTally {
    /// Candidate index within the vote
    pub index: u32,
    /// Candidate name
    pub name: String,
    /// Weight received
    pub votes: Weight,
}

/// Current standings of a vote, in candidate order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResults {
    pub vote_id: u64,
    pub phase: VotePhase,
    pub candidates: Vec<CandidateTally>,
}

impl VoteResults {
    pub(crate) fn from_vote(vote: &Vote, now: Timestamp) -> Self {
        let candidates = vote
            .candidates
            .iter()
            .zip(vote.tally.iter())
            .enumerate()
            .map(|(i, (name, votes))| CandidateTally {
                index: i as u32,
                name: name.clone(),
                votes: *votes,
            })
            .collect();

        Self {
            vote_id: vote.id,
            phase: vote.phase_at(now),
            candidates,
        }
    }

    /// Candidate names, in index order.
    pub fn names(&self) -> Vec<String> {
        self.candidates.iter().map(|c| c.name.clone()).collect()
    }

    /// Totals, in index order.
    pub fn totals(&self) -> Vec<Weight> {
        self.candidates.iter().map(|c| c.votes).collect()
    }
}

/// One identity's ballot on one vote, restricted to the selected candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVoteResult {
    pub vote_id: u64,
    /// Selected candidates with the weight delivered to each; empty without a ballot
    pub selections: Vec<CandidateTally>,
    /// The ballot predates a candidate-list replacement and counts for nothing
    pub stale: bool,
}

impl UserVoteResult {
    pub(crate) fn empty(vote_id: u64) -> Self {
        Self {
            vote_id,
            selections: Vec::new(),
            stale: false,
        }
    }

    pub(crate) fn from_ballot(vote: &Vote, ballot: &Ballot) -> Self {
        let weight = ballot.effective_weight(vote.revision);
        let selections = ballot
            .selected
            .iter()
            .zip(ballot.candidate_names.iter())
            .map(|(&index, name)| CandidateTally {
                index,
                name: name.clone(),
                votes: weight,
            })
            .collect();

        Self {
            vote_id: vote.id,
            selections,
            stale: ballot.is_stale(vote.revision),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

/// Vote metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteInfo {
    pub id: u64,
    pub candidates: Vec<String>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub phase: VotePhase,
    pub revision: u32,
    pub ballot_count: usize,
    pub created_by: Address,
}

impl VoteInfo {
    pub(crate) fn from_vote(vote: &Vote, now: Timestamp) -> Self {
        Self {
            id: vote.id,
            candidates: vote.candidates.clone(),
            start_time: vote.start_time,
            end_time: vote.end_time,
            phase: vote.phase_at(now),
            revision: vote.revision,
            ballot_count: vote.ballot_count(),
            created_by: vote.created_by,
        }
    }
}

/// Stored tally compared with one rebuilt from live ballots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyAudit {
    pub vote_id: u64,
    pub stored: Vec<Weight>,
    pub recomputed: Vec<Weight>,
}

impl TallyAudit {
    pub(crate) fn of(vote: &Vote) -> Self {
        Self {
            vote_id: vote.id,
            stored: vote.tally.clone(),
            recomputed: vote.recompute_tally(),
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.stored == self.recomputed
    }
}
