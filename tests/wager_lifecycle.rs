//! Integration tests for the wager library
//!
//! Drives the public `WagerStore` API the way the HTTP layer does:
//! users join a group by invite code, bet, prove, vote and settle.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

use sidebet_backend::wager::settlement::compute_payouts;
use sidebet_backend::wager::{
    BetStatus, ManualClock, NewBet, Participant, ProofType, Resolution, Side, WagerError,
    WagerPolicy, WagerStore,
};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

fn store() -> (WagerStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start()));
    (WagerStore::new(WagerPolicy::default(), clock.clone()), clock)
}

fn participants(winners: usize, losers: usize) -> Vec<Participant> {
    let a = std::iter::repeat(Side::A).take(winners);
    let b = std::iter::repeat(Side::B).take(losers);
    a.chain(b)
        .map(|side| Participant {
            user_id: uuid::Uuid::new_v4(),
            side,
            accepted_at: start(),
        })
        .collect()
}

#[test]
fn test_group_to_settlement() {
    let (mut store, clock) = store();

    let alice = store.create_user("alice@example.com", "Alice", None).unwrap();
    let bob = store.create_user("bob@example.com", "Bob", None).unwrap();

    let group = store.create_group("Book Club", alice.id).unwrap();
    assert_eq!(group.members, vec![alice.id]);

    // Codes match regardless of case and padding
    let lowered = format!("  {}  ", group.invite_code.to_lowercase());
    let group = store.join_group(&lowered, bob.id).unwrap();
    assert_eq!(group.members, vec![alice.id, bob.id]);

    let bet = store
        .create_bet(NewBet {
            group_id: group.id,
            creator_id: bob.id,
            title: "Finish the novel by Friday".to_string(),
            description: String::new(),
            side_a: "Finished".to_string(),
            side_b: "Not finished".to_string(),
            stake: 15,
            event_date: start() + Duration::days(4),
            proof_type: ProofType::Vote,
            arbiter_id: None,
        })
        .unwrap();
    assert_eq!(bet.status, BetStatus::Draft);

    let bet = store.accept_bet(&bet.id, alice.id, Side::A).unwrap();
    assert_eq!(bet.status, BetStatus::Pending);
    let bet = store.accept_bet(&bet.id, bob.id, Side::B).unwrap();
    assert_eq!(bet.status, BetStatus::Locked);

    // Nothing happens before the event date
    assert_eq!(store.check_and_progress_bet(&bet.id).unwrap(), BetStatus::Locked);
    clock.advance(Duration::days(5));
    assert_eq!(
        store.check_and_progress_bet(&bet.id).unwrap(),
        BetStatus::AwaitingProof
    );

    let bet = store
        .submit_proof(&bet.id, alice.id, "Photo of the last page")
        .unwrap();
    assert_eq!(bet.status, BetStatus::Voting);

    let resolution = store.vote_on_bet(&bet.id, bob.id, Side::A).unwrap();
    match &resolution {
        Resolution::Settled { winner, entries } => {
            assert_eq!(*winner, Side::A);
            assert_eq!(entries.len(), 2);
        }
        Resolution::AlreadyResolved => panic!("first vote should settle"),
    }

    // Later votes and resolves are no-ops
    assert_eq!(
        store.vote_on_bet(&bet.id, alice.id, Side::B).unwrap(),
        Resolution::AlreadyResolved
    );
    assert_eq!(
        store.resolve_bet(&bet.id, Side::B).unwrap(),
        Resolution::AlreadyResolved
    );
    assert_eq!(store.bet_ledger(&bet.id).unwrap().len(), 2);

    assert_eq!(store.user_balance(&alice.id).unwrap(), 15.0);
    assert_eq!(store.user_balance(&bob.id).unwrap(), -15.0);
    assert_eq!(store.get_bet(&bet.id).unwrap().winner, Some(Side::A));
}

#[test]
fn test_rejected_operations_leave_state_alone() {
    let (mut store, _clock) = store();
    let alice = store.create_user("alice@example.com", "Alice", None).unwrap();
    let bob = store.create_user("bob@example.com", "Bob", None).unwrap();
    let carol = store.create_user("carol@example.com", "Carol", None).unwrap();
    let group = store.create_group("Office", alice.id).unwrap();
    store.join_group(&group.invite_code, bob.id).unwrap();

    let err = store.join_group("NOPE00", carol.id).unwrap_err();
    assert!(matches!(err, WagerError::UnknownInviteCode { .. }));
    let err = store.join_group(&group.invite_code, bob.id).unwrap_err();
    assert!(matches!(err, WagerError::AlreadyMember { .. }));
    assert_eq!(store.get_group(&group.id).unwrap().members.len(), 2);

    let bet = store
        .create_bet(NewBet {
            group_id: group.id,
            creator_id: alice.id,
            title: "Coffee machine fixed this week".to_string(),
            description: String::new(),
            side_a: "Fixed".to_string(),
            side_b: "Broken".to_string(),
            stake: 3,
            event_date: start() + Duration::days(7),
            proof_type: ProofType::Vote,
            arbiter_id: None,
        })
        .unwrap();
    store.accept_bet(&bet.id, alice.id, Side::A).unwrap();
    store.accept_bet(&bet.id, bob.id, Side::B).unwrap();

    // Carol joins late; the bet is already locked
    store.join_group(&group.invite_code, carol.id).unwrap();
    let err = store.accept_bet(&bet.id, carol.id, Side::A).unwrap_err();
    assert!(matches!(err, WagerError::InvalidState { .. }));
    assert_eq!(store.get_bet(&bet.id).unwrap().participants.len(), 2);
}

#[test]
fn test_unfilled_bet_voids_after_event() {
    let (mut store, clock) = store();
    let alice = store.create_user("alice@example.com", "Alice", None).unwrap();
    let group = store.create_group("Solo", alice.id).unwrap();
    let bet = store
        .create_bet(NewBet {
            group_id: group.id,
            creator_id: alice.id,
            title: "Run 10k".to_string(),
            description: String::new(),
            side_a: "Yes".to_string(),
            side_b: "No".to_string(),
            stake: 1,
            event_date: start() + Duration::hours(1),
            proof_type: ProofType::Vote,
            arbiter_id: None,
        })
        .unwrap();
    store.accept_bet(&bet.id, alice.id, Side::A).unwrap();

    clock.advance(Duration::hours(2));
    let changed = store.progress_all();
    assert_eq!(changed, vec![(bet.id, BetStatus::Void)]);
    assert!(store.resolve_bet(&bet.id, Side::A).is_err());
    assert!(store.bet_ledger(&bet.id).unwrap().is_empty());
}

#[test]
fn test_payout_ratios() {
    let cases: [(usize, usize, u64, f64); 4] = [
        (1, 2, 10, 20.0),
        (1, 3, 10, 30.0),
        (2, 1, 10, 5.0),
        (3, 2, 9, 6.0),
    ];

    for (winners, losers, stake, per_winner) in cases {
        let payouts = compute_payouts(stake, &participants(winners, losers), Side::A);
        assert_eq!(payouts.len(), winners + losers);

        let (won, lost): (Vec<_>, Vec<_>) = payouts.iter().partition(|p| p.amount > 0.0);
        assert_eq!(won.len(), winners);
        assert!(won.iter().all(|p| p.amount == per_winner));
        assert!(lost.iter().all(|p| p.amount == -(stake as f64)));

        let total: f64 = payouts.iter().map(|p| p.amount).sum();
        assert_eq!(total, 0.0);
    }
}

#[test]
fn test_one_sided_bet_pays_nothing() {
    assert!(compute_payouts(10, &participants(2, 0), Side::A).is_empty());
    assert!(compute_payouts(10, &participants(0, 2), Side::A).is_empty());
}
