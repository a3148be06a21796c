//! Demo dataset for local runs (`SEED_DEMO=true`).

use crate::wager::error::WagerResult;
use crate::wager::models::{BetId, GroupId, NewBet, ProofType, Side, UserId};
use crate::wager::store::WagerStore;
use chrono::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct DemoSeed {
    pub users: Vec<UserId>,
    pub group_id: GroupId,
    pub invite_code: String,
    pub bets: Vec<BetId>,
}

/// Three friends in one group with an open bet and a locked one.
pub fn seed_demo(store: &mut WagerStore) -> WagerResult<DemoSeed> {
    let now = store.now();
    let alice = store.create_user("alice@sidebet.dev", "Alice", None)?;
    let bob = store.create_user("bob@sidebet.dev", "Bob", None)?;
    let carol = store.create_user("carol@sidebet.dev", "Carol", None)?;

    let group = store.create_group("Weekend Warriors", alice.id)?;
    store.join_group(&group.invite_code, bob.id)?;
    store.join_group(&group.invite_code, carol.id)?;

    let open = store.create_bet(NewBet {
        group_id: group.id,
        creator_id: bob.id,
        title: "Rain on Saturday?".to_string(),
        description: "Any measurable rain downtown".to_string(),
        side_a: "Rain".to_string(),
        side_b: "Dry".to_string(),
        stake: 5,
        event_date: now + Duration::days(3),
        proof_type: ProofType::Vote,
        arbiter_id: None,
    })?;
    store.accept_bet(&open.id, alice.id, Side::A)?;

    let locked = store.create_bet(NewBet {
        group_id: group.id,
        creator_id: alice.id,
        title: "Marathon under four hours".to_string(),
        description: String::new(),
        side_a: "Under".to_string(),
        side_b: "Over".to_string(),
        stake: 20,
        event_date: now + Duration::days(7),
        proof_type: ProofType::Arbiter,
        arbiter_id: Some(carol.id),
    })?;
    store.accept_bet(&locked.id, alice.id, Side::A)?;
    store.accept_bet(&locked.id, bob.id, Side::B)?;

    info!(
        group_id = %group.id,
        invite_code = %group.invite_code,
        "🌱 Demo data seeded"
    );

    Ok(DemoSeed {
        users: vec![alice.id, bob.id, carol.id],
        group_id: group.id,
        invite_code: group.invite_code,
        bets: vec![open.id, locked.id],
    })
}
