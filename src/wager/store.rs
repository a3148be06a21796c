//! Wager Store
//!
//! Single owner of the user, group and bet registries plus the settlement
//! ledger. Every operation runs to completion against in-memory state; share
//! a store across threads by wrapping it in a lock.

use crate::wager::clock::{Clock, SystemClock};
use crate::wager::error::{WagerError, WagerResult};
use crate::wager::groups::GroupRegistry;
use crate::wager::ledger::Ledger;
use crate::wager::lifecycle::{can_update_status, status_after_acceptance, time_progression};
use crate::wager::models::{
    Bet, BetId, BetStatus, Group, GroupId, LedgerEntry, NewBet, Participant, Proof, ProofType,
    Resolution, Side, User, UserId, Vote, MAX_STAKE,
};
use crate::wager::settlement::compute_payouts;
use crate::wager::users::UserRegistry;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Store behaviour switches
#[derive(Debug, Clone)]
pub struct WagerPolicy {
    /// Refuse a second participant on an already-taken side.
    pub one_per_side: bool,
    pub invite_code_len: usize,
}

impl Default for WagerPolicy {
    fn default() -> Self {
        Self {
            one_per_side: true,
            invite_code_len: 6,
        }
    }
}

pub struct WagerStore {
    users: UserRegistry,
    groups: GroupRegistry,
    bets: Vec<Bet>,
    bet_index: HashMap<BetId, usize>,
    ledger: Ledger,
    policy: WagerPolicy,
    clock: Arc<dyn Clock>,
}

impl Default for WagerStore {
    fn default() -> Self {
        Self::new(WagerPolicy::default(), Arc::new(SystemClock))
    }
}

impl WagerStore {
    pub fn new(policy: WagerPolicy, clock: Arc<dyn Clock>) -> Self {
        let groups = GroupRegistry::new(policy.invite_code_len);
        Self::from_parts(policy, clock, groups)
    }

    /// Deterministic invite codes, for tests and demos.
    pub fn with_rng(policy: WagerPolicy, clock: Arc<dyn Clock>, rng: StdRng) -> Self {
        let groups = GroupRegistry::with_rng(policy.invite_code_len, rng);
        Self::from_parts(policy, clock, groups)
    }

    fn from_parts(mut policy: WagerPolicy, clock: Arc<dyn Clock>, groups: GroupRegistry) -> Self {
        policy.invite_code_len = groups.code_len();
        Self {
            users: UserRegistry::new(),
            groups,
            bets: Vec::new(),
            bet_index: HashMap::new(),
            ledger: Ledger::new(),
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> &WagerPolicy {
        &self.policy
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ===== Users =====

    pub fn create_user(
        &mut self,
        email: &str,
        display_name: &str,
        avatar: Option<String>,
    ) -> WagerResult<User> {
        let now = self.clock.now();
        self.users.create(email, display_name, avatar, now)
    }

    pub fn get_user(&self, user_id: &UserId) -> Option<&User> {
        self.users.get(user_id)
    }

    pub fn get_user_by_email(&self, email: &str) -> Option<&User> {
        self.users.get_by_email(email)
    }

    pub fn update_avatar(&mut self, user_id: &UserId, avatar: Option<String>) -> WagerResult<User> {
        self.users.update_avatar(user_id, avatar)
    }

    fn require_user(&self, user_id: &UserId) -> WagerResult<()> {
        if self.users.contains(user_id) {
            Ok(())
        } else {
            Err(WagerError::UserNotFound { user_id: *user_id })
        }
    }

    // ===== Groups =====

    pub fn create_group(&mut self, name: &str, creator_id: UserId) -> WagerResult<Group> {
        self.require_user(&creator_id)?;
        let now = self.clock.now();
        self.groups.create(name, creator_id, now)
    }

    pub fn join_group(&mut self, code: &str, user_id: UserId) -> WagerResult<Group> {
        self.require_user(&user_id)?;
        self.groups.join(code, user_id)
    }

    pub fn get_group(&self, group_id: &GroupId) -> Option<&Group> {
        self.groups.get(group_id)
    }

    pub fn user_groups(&self, user_id: &UserId) -> Vec<Group> {
        self.groups.for_user(user_id)
    }

    fn require_member(&self, group_id: &GroupId, user_id: &UserId) -> WagerResult<()> {
        if self.groups.is_member(group_id, user_id)? {
            Ok(())
        } else {
            Err(WagerError::NotGroupMember {
                group_id: *group_id,
                user_id: *user_id,
            })
        }
    }

    // ===== Bets =====

    pub fn create_bet(&mut self, new_bet: NewBet) -> WagerResult<Bet> {
        self.require_user(&new_bet.creator_id)?;
        self.require_member(&new_bet.group_id, &new_bet.creator_id)?;

        let title = non_blank("title", &new_bet.title)?;
        let side_a = non_blank("side_a", &new_bet.side_a)?;
        let side_b = non_blank("side_b", &new_bet.side_b)?;
        if new_bet.stake == 0 || new_bet.stake > MAX_STAKE {
            return Err(WagerError::InvalidStake {
                stake: new_bet.stake,
            });
        }

        let arbiter_id = match new_bet.proof_type {
            ProofType::Arbiter => {
                let arbiter = new_bet.arbiter_id.ok_or(WagerError::MissingArbiter)?;
                self.require_member(&new_bet.group_id, &arbiter)?;
                Some(arbiter)
            }
            ProofType::Vote => None,
        };

        let bet = Bet {
            id: Uuid::new_v4(),
            group_id: new_bet.group_id,
            creator_id: new_bet.creator_id,
            title,
            description: new_bet.description.trim().to_string(),
            side_a,
            side_b,
            stake: new_bet.stake,
            event_date: new_bet.event_date,
            status: BetStatus::Draft,
            proof_type: new_bet.proof_type,
            arbiter_id,
            winner: None,
            participants: Vec::new(),
            proof: None,
            votes: Vec::new(),
            created_at: self.clock.now(),
            resolved_at: None,
        };

        self.bet_index.insert(bet.id, self.bets.len());
        self.bets.push(bet.clone());

        info!(
            bet_id = %bet.id,
            group_id = %bet.group_id,
            stake = bet.stake,
            "🎲 Created bet: {}",
            bet.title
        );
        Ok(bet)
    }

    pub fn get_bet(&self, bet_id: &BetId) -> Option<&Bet> {
        self.bet_index.get(bet_id).map(|&i| &self.bets[i])
    }

    pub fn group_bets(&self, group_id: &GroupId) -> WagerResult<Vec<Bet>> {
        if self.groups.get(group_id).is_none() {
            return Err(WagerError::GroupNotFound {
                group_id: *group_id,
            });
        }
        Ok(self
            .bets
            .iter()
            .filter(|b| &b.group_id == group_id)
            .cloned()
            .collect())
    }

    /// Bets the user created or takes part in.
    pub fn user_bets(&self, user_id: &UserId) -> Vec<Bet> {
        self.bets
            .iter()
            .filter(|b| &b.creator_id == user_id || b.is_participant(user_id))
            .cloned()
            .collect()
    }

    fn bet_slot(&self, bet_id: &BetId) -> WagerResult<usize> {
        self.bet_index
            .get(bet_id)
            .copied()
            .ok_or(WagerError::BetNotFound { bet_id: *bet_id })
    }

    /// Take a side. Participants are unchanged when this fails.
    pub fn accept_bet(&mut self, bet_id: &BetId, user_id: UserId, side: Side) -> WagerResult<Bet> {
        let slot = self.bet_slot(bet_id)?;
        self.require_user(&user_id)?;

        let bet = &self.bets[slot];
        if !bet.status.is_open() {
            return Err(WagerError::InvalidState {
                bet_id: bet.id,
                status: bet.status,
                action: "accept",
            });
        }
        self.require_member(&bet.group_id, &user_id)?;
        if bet.is_participant(&user_id) {
            return Err(WagerError::DuplicateParticipant {
                bet_id: bet.id,
                user_id,
            });
        }
        if self.policy.one_per_side && bet.side_taken(side) {
            return Err(WagerError::SideTaken {
                bet_id: bet.id,
                side,
            });
        }

        let now = self.clock.now();
        let bet = &mut self.bets[slot];
        bet.participants.push(Participant {
            user_id,
            side,
            accepted_at: now,
        });
        let previous = bet.status;
        bet.status = status_after_acceptance(bet.participants.len());

        info!(
            bet_id = %bet.id,
            user_id = %user_id,
            side = %side,
            from = %previous,
            to = %bet.status,
            "✋ Side accepted"
        );
        Ok(bet.clone())
    }

    pub fn submit_proof(
        &mut self,
        bet_id: &BetId,
        user_id: UserId,
        text: &str,
    ) -> WagerResult<Bet> {
        let slot = self.bet_slot(bet_id)?;
        let bet = &self.bets[slot];
        if bet.status != BetStatus::AwaitingProof {
            return Err(WagerError::InvalidState {
                bet_id: bet.id,
                status: bet.status,
                action: "submit proof for",
            });
        }
        if !bet.is_participant(&user_id) {
            return Err(WagerError::NotParticipant {
                bet_id: bet.id,
                user_id,
            });
        }
        let text = non_blank("proof", text)?;

        let now = self.clock.now();
        let bet = &mut self.bets[slot];
        bet.proof = Some(Proof {
            submitted_by: user_id,
            text,
            submitted_at: now,
        });
        bet.status = BetStatus::Voting;

        info!(bet_id = %bet.id, user_id = %user_id, "📎 Proof submitted, voting open");
        Ok(bet.clone())
    }

    /// First accepted vote decides the bet.
    pub fn vote_on_bet(
        &mut self,
        bet_id: &BetId,
        voter_id: UserId,
        side: Side,
    ) -> WagerResult<Resolution> {
        let slot = self.bet_slot(bet_id)?;
        let bet = &self.bets[slot];
        if bet.status == BetStatus::Resolved {
            debug!(bet_id = %bet.id, "Vote on resolved bet ignored");
            return Ok(Resolution::AlreadyResolved);
        }
        if bet.status != BetStatus::Voting {
            return Err(WagerError::InvalidState {
                bet_id: bet.id,
                status: bet.status,
                action: "vote on",
            });
        }
        self.require_member(&bet.group_id, &voter_id)?;
        if bet.proof_type == ProofType::Arbiter && bet.arbiter_id != Some(voter_id) {
            return Err(WagerError::NotArbiter {
                bet_id: bet.id,
                user_id: voter_id,
            });
        }

        let now = self.clock.now();
        self.bets[slot].votes.push(Vote {
            voter_id,
            side,
            cast_at: now,
        });
        Ok(self.settle(slot, side))
    }

    /// Declare the winner and write the ledger entries.
    ///
    /// Resolving a resolved bet is a no-op returning `AlreadyResolved`.
    pub fn resolve_bet(&mut self, bet_id: &BetId, winner: Side) -> WagerResult<Resolution> {
        let slot = self.bet_slot(bet_id)?;
        let bet = &self.bets[slot];
        match bet.status {
            BetStatus::Resolved => {
                debug!(bet_id = %bet.id, "Bet already resolved");
                Ok(Resolution::AlreadyResolved)
            }
            BetStatus::Void => Err(WagerError::InvalidState {
                bet_id: bet.id,
                status: bet.status,
                action: "resolve",
            }),
            _ => Ok(self.settle(slot, winner)),
        }
    }

    fn settle(&mut self, slot: usize, winner: Side) -> Resolution {
        let now = self.clock.now();
        let bet_id = self.bets[slot].id;
        let payouts = {
            let bet = &self.bets[slot];
            compute_payouts(bet.stake, &bet.participants, winner)
        };

        let entries: Vec<LedgerEntry> = payouts
            .into_iter()
            .map(|p| self.ledger.append(p.user_id, bet_id, p.amount, now))
            .collect();

        let bet = &mut self.bets[slot];
        bet.winner = Some(winner);
        bet.status = BetStatus::Resolved;
        bet.resolved_at = Some(now);

        info!(
            bet_id = %bet.id,
            winner = %winner,
            entries = entries.len(),
            "🏁 Bet resolved: {} over {}",
            bet.side_label(winner),
            bet.side_label(winner.opposite())
        );
        Resolution::Settled { winner, entries }
    }

    /// Manual forward-only status change.
    pub fn update_bet_status(&mut self, bet_id: &BetId, status: BetStatus) -> WagerResult<Bet> {
        let slot = self.bet_slot(bet_id)?;
        let bet = &mut self.bets[slot];
        if !can_update_status(bet.status, status) {
            return Err(WagerError::InvalidTransition {
                from: bet.status,
                to: status,
            });
        }
        info!(bet_id = %bet.id, from = %bet.status, to = %status, "Status updated");
        bet.status = status;
        Ok(bet.clone())
    }

    /// Apply event-date progression to one bet and return its status.
    pub fn check_and_progress_bet(&mut self, bet_id: &BetId) -> WagerResult<BetStatus> {
        let slot = self.bet_slot(bet_id)?;
        let now = self.clock.now();
        Ok(self.progress_slot(slot, now))
    }

    /// Progress every bet still in flight. Returns the bets that changed.
    pub fn progress_all(&mut self) -> Vec<(BetId, BetStatus)> {
        let now = self.clock.now();
        let mut changed = Vec::new();
        for slot in 0..self.bets.len() {
            let before = self.bets[slot].status;
            if before.is_terminal() {
                continue;
            }
            let after = self.progress_slot(slot, now);
            if after != before {
                changed.push((self.bets[slot].id, after));
            }
        }
        changed
    }

    fn progress_slot(&mut self, slot: usize, now: DateTime<Utc>) -> BetStatus {
        let bet = &mut self.bets[slot];
        if let Some(next) =
            time_progression(bet.status, bet.participants.len(), bet.event_date, now)
        {
            info!(bet_id = %bet.id, from = %bet.status, to = %next, "⏰ Event date passed");
            bet.status = next;
        }
        bet.status
    }

    // ===== Ledger =====

    pub fn user_balance(&self, user_id: &UserId) -> WagerResult<f64> {
        self.require_user(user_id)?;
        Ok(self.ledger.balance(user_id))
    }

    pub fn user_ledger(&self, user_id: &UserId) -> WagerResult<Vec<LedgerEntry>> {
        self.require_user(user_id)?;
        Ok(self.ledger.for_user(user_id))
    }

    pub fn bet_ledger(&self, bet_id: &BetId) -> WagerResult<Vec<LedgerEntry>> {
        self.bet_slot(bet_id)?;
        Ok(self.ledger.for_bet(bet_id))
    }

    /// Append a manual entry outside of bet resolution.
    pub fn add_ledger_entry(
        &mut self,
        user_id: UserId,
        bet_id: BetId,
        amount: f64,
    ) -> WagerResult<LedgerEntry> {
        self.require_user(&user_id)?;
        self.bet_slot(&bet_id)?;
        if !amount.is_finite() {
            return Err(WagerError::InvalidInput {
                field: "amount",
                reason: "must be a finite number".to_string(),
            });
        }
        let now = self.clock.now();
        Ok(self.ledger.append(user_id, bet_id, amount, now))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

fn non_blank(field: &'static str, value: &str) -> WagerResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(WagerError::InvalidInput {
            field,
            reason: "must not be blank".to_string(),
        });
    }
    Ok(value.to_string())
}
