//! `dao_` JSON-RPC methods.
//!
//! Mutations take the caller's address as their first parameter. The engine
//! trusts it as the authenticated identity.

use crate::error::RpcError;
use jsonrpsee::proc_macros::rpc;
use std::str::FromStr;
use std::sync::Arc;
use votedao_governance::{UserVoteResult, VoteInfo, VoteResults, VotingEngine};
use votedao_types::{Address, Timestamp, Weight};

#[rpc(server)]
pub trait DaoApi {
    #[method(name = "dao_voteCount")]
    fn vote_count(&self) -> Result<u64, RpcError>;

    #[method(name = "dao_getCandidates")]
    fn get_candidates(&self, vote_id: u64) -> Result<Vec<String>, RpcError>;

    #[method(name = "dao_getVote")]
    fn get_vote(&self, vote_id: u64) -> Result<VoteInfo, RpcError>;

    #[method(name = "dao_getVoteResults")]
    fn get_vote_results(&self, vote_id: u64) -> Result<VoteResults, RpcError>;

    #[method(name = "dao_getUserVoteResults")]
    fn get_user_vote_results(&self, vote_id: u64, address: String) -> Result<UserVoteResult, RpcError>;

    #[method(name = "dao_getAllUserVoteResults")]
    fn get_all_user_vote_results(&self, address: String) -> Result<Vec<UserVoteResult>, RpcError>;

    #[method(name = "dao_userCurrentlyVoted")]
    fn user_currently_voted(&self, address: String) -> Result<bool, RpcError>;

    #[method(name = "dao_isAdmin")]
    fn is_admin(&self, address: String) -> Result<bool, RpcError>;

    #[method(name = "dao_previewDistribution")]
    fn preview_distribution(&self, address: String, count: usize) -> Result<Weight, RpcError>;

    #[method(name = "dao_vote")]
    fn vote(&self, from: String, vote_id: u64, selected: Vec<u32>) -> Result<(), RpcError>;

    #[method(name = "dao_revokeVote")]
    fn revoke_vote(&self, from: String, vote_id: u64) -> Result<(), RpcError>;

    #[method(name = "dao_assignAdmin")]
    fn assign_admin(&self, from: String, address: String) -> Result<(), RpcError>;

    #[method(name = "dao_removeAdmin")]
    fn remove_admin(&self, from: String, address: String) -> Result<(), RpcError>;

    #[method(name = "dao_createVote")]
    fn create_vote(
        &self,
        from: String,
        candidates: Vec<String>,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Result<u64, RpcError>;

    #[method(name = "dao_editVote")]
    fn edit_vote(
        &self,
        from: String,
        vote_id: u64,
        candidates: Vec<String>,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Result<(), RpcError>;
}

/// Parse a `0x`-prefixed hex address parameter.
pub fn parse_address(s: &str) -> Result<Address, RpcError> {
    Address::from_str(s).map_err(|e| RpcError::InvalidParams(format!("invalid address {}: {}", s, e)))
}

/// Handler backing [`DaoApiServer`].
pub struct DaoRpc {
    engine: Arc<VotingEngine>,
}

impl DaoRpc {
    pub fn new(engine: Arc<VotingEngine>) -> Self {
        Self { engine }
    }
}

impl DaoApiServer for DaoRpc {
    fn vote_count(&self) -> Result<u64, RpcError> {
        Ok(self.engine.vote_count())
    }

    fn get_candidates(&self, vote_id: u64) -> Result<Vec<String>, RpcError> {
        Ok(self.engine.get_candidates(vote_id)?)
    }

    fn get_vote(&self, vote_id: u64) -> Result<VoteInfo, RpcError> {
        Ok(self.engine.get_vote(vote_id)?)
    }

    fn get_vote_results(&self, vote_id: u64) -> Result<VoteResults, RpcError> {
        Ok(self.engine.get_vote_results(vote_id)?)
    }

    fn get_user_vote_results(&self, vote_id: u64, address: String) -> Result<UserVoteResult, RpcError> {
        let who = parse_address(&address)?;
        Ok(self.engine.get_user_vote_results(vote_id, &who)?)
    }

    fn get_all_user_vote_results(&self, address: String) -> Result<Vec<UserVoteResult>, RpcError> {
        let who = parse_address(&address)?;
        Ok(self.engine.get_all_user_vote_results(&who))
    }

    fn user_currently_voted(&self, address: String) -> Result<bool, RpcError> {
        let who = parse_address(&address)?;
        Ok(self.engine.user_currently_voted(&who))
    }

    fn is_admin(&self, address: String) -> Result<bool, RpcError> {
        let who = parse_address(&address)?;
        Ok(self.engine.is_admin(&who))
    }

    fn preview_distribution(&self, address: String, count: usize) -> Result<Weight, RpcError> {
        let who = parse_address(&address)?;
        Ok(self.engine.preview_distribution(&who, count)?)
    }

    fn vote(&self, from: String, vote_id: u64, selected: Vec<u32>) -> Result<(), RpcError> {
        let caller = parse_address(&from)?;
        Ok(self.engine.vote(&caller, vote_id, &selected)?)
    }

    fn revoke_vote(&self, from: String, vote_id: u64) -> Result<(), RpcError> {
        let caller = parse_address(&from)?;
        Ok(self.engine.revoke_vote(&caller, vote_id)?)
    }

    fn assign_admin(&self, from: String, address: String) -> Result<(), RpcError> {
        let caller = parse_address(&from)?;
        let who = parse_address(&address)?;
        Ok(self.engine.assign_admin(&caller, who)?)
    }

    fn remove_admin(&self, from: String, address: String) -> Result<(), RpcError> {
        let caller = parse_address(&from)?;
        let who = parse_address(&address)?;
        Ok(self.engine.remove_admin(&caller, &who)?)
    }

    fn create_vote(
        &self,
        from: String,
        candidates: Vec<String>,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Result<u64, RpcError> {
        let caller = parse_address(&from)?;
        Ok(self.engine.create_vote(&caller, candidates, start_time, end_time)?)
    }

    fn edit_vote(
        &self,
        from: String,
        vote_id: u64,
        candidates: Vec<String>,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Result<(), RpcError> {
        let caller = parse_address(&from)?;
        Ok(self
            .engine
            .edit_vote(&caller, vote_id, candidates, start_time, end_time)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use votedao_governance::{ManualClock, StaticBalances, VotePhase};

    const ADMIN: Address = Address::from_bytes([0xaa; 20]);
    const VOTER: Address = Address::from_bytes([0x01; 20]);

    fn handler() -> (DaoRpc, Arc<ManualClock>) {
        let balances = Arc::new(StaticBalances::with_balances([(VOTER, Weight::from_tokens(10))]));
        let clock = Arc::new(ManualClock::new(0));
        let engine = Arc::new(VotingEngine::new(ADMIN, balances, clock.clone()));
        (DaoRpc::new(engine), clock)
    }

    #[test]
    fn test_mutations_map_errors() {
        let (rpc, clock) = handler();

        let err = rpc
            .create_vote(VOTER.to_string(), vec!["A".into()], 100, 200)
            .unwrap_err();
        assert_eq!(err.code(), -32003);

        let id = rpc
            .create_vote(ADMIN.to_string(), vec!["A".into(), "B".into()], 100, 200)
            .unwrap();
        assert_eq!(rpc.vote(VOTER.to_string(), id, vec![0]).unwrap_err().code(), -32002);

        clock.set(150);
        assert_eq!(rpc.vote(VOTER.to_string(), id, vec![5]).unwrap_err().code(), -32602);
        assert_eq!(rpc.vote(VOTER.to_string(), 7, vec![0]).unwrap_err().code(), -32001);
        assert_eq!(rpc.vote("0x1234".to_string(), id, vec![0]).unwrap_err().code(), -32602);
        assert_eq!(
            rpc.remove_admin(ADMIN.to_string(), ADMIN.to_string())
                .unwrap_err()
                .code(),
            -32000
        );
    }

    #[test]
    fn test_vote_flow_through_handler() {
        let (rpc, clock) = handler();
        let id = rpc
            .create_vote(ADMIN.to_string(), vec!["A".into(), "B".into()], 100, 200)
            .unwrap();
        clock.set(150);

        rpc.vote(VOTER.to_string(), id, vec![0, 1]).unwrap();
        let results = rpc.get_vote_results(id).unwrap();
        assert_eq!(results.phase, VotePhase::Open);
        assert_eq!(results.totals(), vec![Weight::from_tokens(5), Weight::from_tokens(5)]);
        assert!(rpc.user_currently_voted(VOTER.to_string()).unwrap());

        rpc.revoke_vote(VOTER.to_string(), id).unwrap();
        assert!(rpc
            .get_user_vote_results(id, VOTER.to_string())
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_module_method_names() {
        let (rpc, clock) = handler();
        let module = rpc.into_rpc();

        let names: Vec<&str> = module.method_names().collect();
        for expected in [
            "dao_voteCount",
            "dao_getCandidates",
            "dao_getVote",
            "dao_getVoteResults",
            "dao_getUserVoteResults",
            "dao_getAllUserVoteResults",
            "dao_userCurrentlyVoted",
            "dao_isAdmin",
            "dao_previewDistribution",
            "dao_vote",
            "dao_revokeVote",
            "dao_assignAdmin",
            "dao_removeAdmin",
            "dao_createVote",
            "dao_editVote",
        ] {
            assert!(names.contains(&expected), "missing {}", expected);
        }

        let id: u64 = module
            .call(
                "dao_createVote",
                [json!(ADMIN.to_string()), json!(["A", "B"]), json!(100), json!(200)],
            )
            .await
            .unwrap();
        assert_eq!(id, 1);

        clock.set(150);
        let _: Value = module
            .call("dao_vote", [json!(VOTER.to_string()), json!(id), json!([1])])
            .await
            .unwrap();

        let results: Value = module.call("dao_getVoteResults", [json!(id)]).await.unwrap();
        assert_eq!(results["voteId"], json!(1));
        assert_eq!(results["phase"], json!("open"));
        assert_eq!(results["candidates"][1]["votes"], json!("10000000000000000000"));

        let preview: Weight = module
            .call("dao_previewDistribution", [json!(VOTER.to_string()), json!(4)])
            .await
            .unwrap();
        assert_eq!(preview.format_units(), "2.5");

        let err = module
            .call::<_, u64>(
                "dao_createVote",
                [json!(VOTER.to_string()), json!(["A"]), json!(100), json!(200)],
            )
            .await;
        assert!(err.is_err());
    }
}
