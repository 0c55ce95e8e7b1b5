//! Admin set: identities allowed to manage votes and other admins.

use crate::error::GovernanceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use votedao_types::Address;

/// Set of admin identities. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSet {
    members: BTreeSet<Address>,
}

impl AdminSet {
    /// Create a set whose only member is the deploying identity.
    pub fn new(founder: Address) -> Self {
        let mut members = BTreeSet::new();
        members.insert(founder);
        Self { members }
    }

    /// Build from an arbitrary list. Fails if the list is empty.
    pub fn from_members(members: impl IntoIterator<Item = Address>) -> Result<Self, GovernanceError> {
        let members: BTreeSet<Address> = members.into_iter().collect();
        if members.is_empty() {
            return Err(GovernanceError::InvalidOperation(
                "admin set cannot be empty".to_string(),
            ));
        }
        Ok(Self { members })
    }

    pub fn contains(&self, who: &Address) -> bool {
        self.members.contains(who)
    }

    /// Fail with `Unauthorized` unless `caller` is an admin.
    pub fn require(&self, caller: &Address) -> Result<(), GovernanceError> {
        if self.contains(caller) {
            Ok(())
        } else {
            Err(GovernanceError::Unauthorized(format!("{} is not an admin", caller)))
        }
    }

    /// Add an admin. Returns `false` if it was already present.
    pub fn insert(&mut self, who: Address) -> bool {
        self.members.insert(who)
    }

    /// Remove an admin. Returns `false` if it was not a member.
    ///
    /// Removing the last remaining admin is rejected.
    pub fn remove(&mut self, who: &Address) -> Result<bool, GovernanceError> {
        if !self.members.contains(who) {
            return Ok(false);
        }
        if self.members.len() == 1 {
            return Err(GovernanceError::InvalidOperation(
                "cannot remove the last admin".to_string(),
            ));
        }
        Ok(self.members.remove(who))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in ascending address order.
    pub fn members(&self) -> Vec<Address> {
        self.members.iter().copied().collect()
    }
}
