//! Balance oracle: the external source of voting weight.
//!
//! The engine only ever reads from the oracle, once per cast, while it holds
//! the state write lock.

use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;
use votedao_types::{Address, Weight};

/// Oracle failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OracleError {
    #[error("balance lookup failed for {0}: {1}")]
    Lookup(Address, String),
}

/// Reports an identity's current voting-weight balance (`balanceOf`).
pub trait BalanceOracle: Send + Sync {
    fn balance_of(&self, who: &Address) -> Result<Weight, OracleError>;
}

/// In-memory balance table.
///
/// Unknown identities hold a zero balance.
#[derive(Debug, Default)]
pub struct StaticBalances {
    balances: RwLock<HashMap<Address, Weight>>,
}

impl StaticBalances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table pre-filled with the given allocations.
    pub fn with_balances(allocations: impl IntoIterator<Item = (Address, Weight)>) -> Self {
        Self {
            balances: RwLock::new(allocations.into_iter().collect()),
        }
    }

    /// Set (or overwrite) an identity's balance.
    pub fn set_balance(&self, who: Address, amount: Weight) {
        self.balances.write().insert(who, amount);
    }

    /// Number of identities with an explicit balance.
    pub fn len(&self) -> usize {
        self.balances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.read().is_empty()
    }
}

impl BalanceOracle for StaticBalances {
    fn balance_of(&self, who: &Address) -> Result<Weight, OracleError> {
        Ok(self.balances.read().get(who).copied().unwrap_or(Weight::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_identity_has_zero_balance() {
        let oracle = StaticBalances::new();
        assert_eq!(
            oracle.balance_of(&Address::from_bytes([9u8; 20])).unwrap(),
            Weight::ZERO
        );
        assert!(oracle.is_empty());
    }

    #[test]
    fn test_set_balance_overwrites() {
        let who = Address::from_bytes([1u8; 20]);
        let oracle = StaticBalances::with_balances([(who, Weight::from_tokens(5))]);
        assert_eq!(oracle.balance_of(&who).unwrap(), Weight::from_tokens(5));

        oracle.set_balance(who, Weight::from_tokens(2));
        assert_eq!(oracle.balance_of(&who).unwrap(), Weight::from_tokens(2));
        assert_eq!(oracle.len(), 1);
    }

    #[test]
    fn test_oracle_error_display() {
        let err = OracleError::Lookup(Address::ZERO, "timeout".to_string());
        assert!(err.to_string().contains("timeout"));
    }
}
