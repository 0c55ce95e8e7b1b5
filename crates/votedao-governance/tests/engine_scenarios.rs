//! End-to-end engine scenarios driven through the public API.

use std::sync::Arc;
use votedao_governance::{
    GovernanceError, ManualClock, StaticBalances, VotePhase, VotingEngine, MAX_CANDIDATES,
    MAX_SELECTIONS,
};
use votedao_types::{Address, Weight};

const ADMIN: Address = Address::from_bytes([0xaa; 20]);
const ALICE: Address = Address::from_bytes([0x01; 20]);
const BOB: Address = Address::from_bytes([0x02; 20]);

struct Harness {
    engine: VotingEngine,
    balances: Arc<StaticBalances>,
    clock: Arc<ManualClock>,
}

fn harness() -> Harness {
    let balances = Arc::new(StaticBalances::with_balances([
        (ALICE, Weight::from_raw(100)),
        (BOB, Weight::from_raw(10)),
    ]));
    let clock = Arc::new(ManualClock::new(0));
    let engine = VotingEngine::new(ADMIN, balances.clone(), clock.clone());
    Harness {
        engine,
        balances,
        clock,
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn totals(h: &Harness, vote_id: u64) -> Vec<u128> {
    h.engine
        .get_vote_results(vote_id)
        .unwrap()
        .totals()
        .iter()
        .map(|w| w.raw())
        .collect()
}

#[test]
fn full_lifecycle_with_recast_and_revoke() {
    let h = harness();
    let id = h.engine.create_vote(&ADMIN, names(&["A", "B"]), 100, 200).unwrap();
    assert_eq!(id, 1);
    assert_eq!(h.engine.get_vote(id).unwrap().phase, VotePhase::Pending);

    h.clock.set(150);
    assert_eq!(h.engine.get_vote(id).unwrap().phase, VotePhase::Open);

    h.engine.vote(&ALICE, id, &[0]).unwrap();
    assert_eq!(totals(&h, id), vec![100, 0]);

    h.engine.vote(&ALICE, id, &[0, 1]).unwrap();
    assert_eq!(totals(&h, id), vec![50, 50]);

    let mine = h.engine.get_user_vote_results(id, &ALICE).unwrap();
    assert_eq!(mine.selections.len(), 2);
    assert_eq!(mine.selections[0].name, "A");
    assert_eq!(mine.selections[1].votes, Weight::from_raw(50));

    h.engine.revoke_vote(&ALICE, id).unwrap();
    assert_eq!(totals(&h, id), vec![0, 0]);
    assert!(h.engine.get_user_vote_results(id, &ALICE).unwrap().is_empty());

    h.clock.set(200);
    assert_eq!(h.engine.get_vote(id).unwrap().phase, VotePhase::Closed);
    assert!(matches!(
        h.engine.vote(&ALICE, id, &[0]),
        Err(GovernanceError::InvalidState(_))
    ));
}

#[test]
fn unauthorized_create_leaves_count_unchanged() {
    let h = harness();
    let err = h
        .engine
        .create_vote(&ALICE, names(&["A"]), 100, 200)
        .unwrap_err();
    assert!(matches!(err, GovernanceError::Unauthorized(_)));
    assert_eq!(h.engine.vote_count(), 0);

    assert!(matches!(
        h.engine.assign_admin(&ALICE, ALICE),
        Err(GovernanceError::Unauthorized(_))
    ));
    assert!(matches!(
        h.engine.edit_vote(&ALICE, 1, Vec::new(), 1, 2),
        Err(GovernanceError::Unauthorized(_))
    ));
}

#[test]
fn selection_limit_is_ten() {
    let h = harness();
    let candidates: Vec<String> = (0..MAX_CANDIDATES).map(|i| format!("c{}", i)).collect();
    let id = h.engine.create_vote(&ADMIN, candidates, 100, 200).unwrap();
    h.clock.set(150);

    let eleven: Vec<u32> = (0..=MAX_SELECTIONS as u32).collect();
    assert!(matches!(
        h.engine.vote(&ALICE, id, &eleven),
        Err(GovernanceError::InvalidArgument(_))
    ));
    assert!(h.engine.get_user_vote_results(id, &ALICE).unwrap().is_empty());

    let ten: Vec<u32> = (0..MAX_SELECTIONS as u32).collect();
    h.engine.vote(&ALICE, id, &ten).unwrap();
    let results = totals(&h, id);
    assert!(results[..10].iter().all(|&t| t == 10));
    assert!(results[10..].iter().all(|&t| t == 0));
}

#[test]
fn candidate_limit_is_twenty() {
    let h = harness();
    let twenty_one: Vec<String> = (0..21).map(|i| format!("c{}", i)).collect();
    assert!(matches!(
        h.engine.create_vote(&ADMIN, twenty_one, 100, 200),
        Err(GovernanceError::InvalidArgument(_))
    ));
    assert_eq!(h.engine.vote_count(), 0);

    let twenty: Vec<String> = (0..20).map(|i| format!("c{}", i)).collect();
    assert_eq!(h.engine.create_vote(&ADMIN, twenty, 100, 200).unwrap(), 1);
}

#[test]
fn invalid_selections_are_rejected() {
    let h = harness();
    let id = h.engine.create_vote(&ADMIN, names(&["A", "B", "C"]), 100, 200).unwrap();
    h.clock.set(150);

    for bad in [&[][..], &[3][..], &[1, 1][..]] {
        assert!(matches!(
            h.engine.vote(&ALICE, id, bad),
            Err(GovernanceError::InvalidArgument(_))
        ));
    }
    assert_eq!(totals(&h, id), vec![0, 0, 0]);
}

#[test]
fn distribution_rounds_down() {
    let h = harness();
    let id = h.engine.create_vote(&ADMIN, names(&["A", "B", "C"]), 100, 200).unwrap();
    h.clock.set(150);

    h.engine.vote(&BOB, id, &[0, 1, 2]).unwrap();
    assert_eq!(totals(&h, id), vec![3, 3, 3]);
    assert_eq!(
        h.engine.preview_distribution(&BOB, 3).unwrap(),
        Weight::from_raw(3)
    );
}

#[test]
fn identical_recast_is_idempotent() {
    let h = harness();
    let id = h.engine.create_vote(&ADMIN, names(&["A", "B"]), 100, 200).unwrap();
    h.clock.set(150);

    h.engine.vote(&ALICE, id, &[1]).unwrap();
    let once = h.engine.get_vote_results(id).unwrap();
    h.engine.vote(&ALICE, id, &[1]).unwrap();
    assert_eq!(h.engine.get_vote_results(id).unwrap(), once);
    assert_eq!(h.engine.get_vote(id).unwrap().ballot_count, 1);
}

#[test]
fn revoke_restores_prior_totals() {
    let h = harness();
    let id = h.engine.create_vote(&ADMIN, names(&["A", "B"]), 100, 200).unwrap();
    h.clock.set(150);

    h.engine.vote(&BOB, id, &[0, 1]).unwrap();
    let before = totals(&h, id);

    h.engine.vote(&ALICE, id, &[0]).unwrap();
    h.engine.revoke_vote(&ALICE, id).unwrap();
    assert_eq!(totals(&h, id), before);

    assert!(matches!(
        h.engine.revoke_vote(&ALICE, id),
        Err(GovernanceError::NotFound(_))
    ));
}

#[test]
fn balance_change_between_casts_uses_new_balance() {
    let h = harness();
    let id = h.engine.create_vote(&ADMIN, names(&["A", "B"]), 100, 200).unwrap();
    h.clock.set(150);

    h.engine.vote(&ALICE, id, &[0]).unwrap();
    h.balances.set_balance(ALICE, Weight::from_raw(30));
    h.engine.vote(&ALICE, id, &[0]).unwrap();

    // The earlier 100 is withdrawn exactly, not recomputed from the new balance.
    assert_eq!(totals(&h, id), vec![30, 0]);
    assert!(h.engine.audit_tally(id).unwrap().is_consistent());
}

#[test]
fn editing_candidates_resets_tally_but_keeps_ballots() {
    let h = harness();
    let id = h.engine.create_vote(&ADMIN, names(&["A", "B"]), 100, 200).unwrap();
    h.clock.set(150);
    h.engine.vote(&ALICE, id, &[1]).unwrap();

    h.engine
        .edit_vote(&ADMIN, id, names(&["X", "Y", "Z"]), 100, 300)
        .unwrap();

    let info = h.engine.get_vote(id).unwrap();
    assert_eq!(info.candidates, names(&["X", "Y", "Z"]));
    assert_eq!(info.end_time, 300);
    assert_eq!(info.revision, 1);
    assert_eq!(info.ballot_count, 1);
    assert_eq!(totals(&h, id), vec![0, 0, 0]);

    // The ballot still names the candidate it was cast for, with no weight.
    let mine = h.engine.get_user_vote_results(id, &ALICE).unwrap();
    assert!(mine.stale);
    assert_eq!(mine.selections[0].name, "B");
    assert_eq!(mine.selections[0].votes, Weight::ZERO);

    // Revoking the stale ballot leaves the fresh tally alone.
    h.engine.vote(&BOB, id, &[2]).unwrap();
    h.engine.revoke_vote(&ALICE, id).unwrap();
    assert_eq!(totals(&h, id), vec![0, 0, 10]);

    // Recasting counts again.
    h.engine.vote(&ALICE, id, &[0]).unwrap();
    assert_eq!(totals(&h, id), vec![100, 0, 10]);
    assert!(!h.engine.get_user_vote_results(id, &ALICE).unwrap().stale);
}

#[test]
fn editing_window_only_keeps_tally() {
    let h = harness();
    let id = h.engine.create_vote(&ADMIN, names(&["A"]), 100, 200).unwrap();
    h.clock.set(150);
    h.engine.vote(&ALICE, id, &[0]).unwrap();

    h.engine.edit_vote(&ADMIN, id, Vec::new(), 100, 160).unwrap();
    assert_eq!(totals(&h, id), vec![100]);
    assert_eq!(h.engine.get_vote(id).unwrap().revision, 0);

    h.clock.set(160);
    assert_eq!(h.engine.get_vote(id).unwrap().phase, VotePhase::Closed);

    assert!(matches!(
        h.engine.edit_vote(&ADMIN, id, Vec::new(), 160, 160),
        Err(GovernanceError::InvalidArgument(_))
    ));
    assert!(matches!(
        h.engine.edit_vote(&ADMIN, 9, Vec::new(), 1, 2),
        Err(GovernanceError::NotFound(_))
    ));
}

#[test]
fn admin_set_is_never_empty() {
    let h = harness();
    assert!(matches!(
        h.engine.remove_admin(&ADMIN, &ADMIN),
        Err(GovernanceError::InvalidOperation(_))
    ));
    assert!(h.engine.is_admin(&ADMIN));

    h.engine.assign_admin(&ADMIN, ALICE).unwrap();
    h.engine.assign_admin(&ADMIN, ALICE).unwrap();
    assert_eq!(h.engine.admins(), vec![ALICE, ADMIN]);

    h.engine.remove_admin(&ALICE, &ADMIN).unwrap();
    assert_eq!(h.engine.admins(), vec![ALICE]);
    assert!(matches!(
        h.engine.create_vote(&ADMIN, names(&["A"]), 1, 2),
        Err(GovernanceError::Unauthorized(_))
    ));

    // Removing a non-admin is a no-op.
    h.engine.remove_admin(&ALICE, &BOB).unwrap();
    assert_eq!(h.engine.admins(), vec![ALICE]);
}

#[test]
fn history_across_votes() {
    let h = harness();
    let first = h.engine.create_vote(&ADMIN, names(&["A", "B"]), 100, 200).unwrap();
    let second = h.engine.create_vote(&ADMIN, names(&["C", "D"]), 100, 200).unwrap();
    h.clock.set(150);

    h.engine.vote(&ALICE, first, &[1]).unwrap();
    assert!(!h.engine.user_currently_voted(&ALICE));

    h.engine.vote(&ALICE, second, &[0]).unwrap();
    assert!(h.engine.user_currently_voted(&ALICE));
    assert!(!h.engine.user_currently_voted(&BOB));

    let history = h.engine.get_all_user_vote_results(&ALICE);
    let ids: Vec<u64> = history.iter().map(|r| r.vote_id).collect();
    assert_eq!(ids, vec![first, second]);
    assert_eq!(history[1].selections[0].name, "C");

    assert!(h.engine.get_all_user_vote_results(&BOB).is_empty());
}

#[test]
fn queries_on_missing_vote_fail() {
    let h = harness();
    assert!(matches!(
        h.engine.get_candidates(1),
        Err(GovernanceError::NotFound(_))
    ));
    assert!(matches!(
        h.engine.get_user_vote_results(1, &ALICE),
        Err(GovernanceError::NotFound(_))
    ));
    assert!(!h.engine.user_currently_voted(&ALICE));
}
