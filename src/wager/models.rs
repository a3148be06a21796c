//! Wager Models
//! Mission: Define users, groups, bets and ledger records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;
pub type GroupId = Uuid;
pub type BetId = Uuid;
pub type LedgerEntryId = Uuid;

/// Number of participants that locks a bet.
pub const LOCK_PARTICIPANTS: usize = 2;

/// Largest stake whose ledger amounts stay exact as `f64` (2^53).
pub const MAX_STAKE: u64 = 1 << 53;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Betting group. `members` keeps join order, creator first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub creator_id: UserId,
    pub invite_code: String,
    pub members: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.members.contains(user_id)
    }
}

/// One of the two outcomes of a bet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Side::A => "A",
            Side::B => "B",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bet lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BetStatus {
    Draft,
    Pending,
    Locked,
    AwaitingProof,
    Voting,
    Resolved,
    /// Event date passed before enough participants joined.
    Void,
}

impl BetStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BetStatus::Draft => "draft",
            BetStatus::Pending => "pending",
            BetStatus::Locked => "locked",
            BetStatus::AwaitingProof => "awaiting_proof",
            BetStatus::Voting => "voting",
            BetStatus::Resolved => "resolved",
            BetStatus::Void => "void",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(BetStatus::Draft),
            "pending" => Some(BetStatus::Pending),
            "locked" => Some(BetStatus::Locked),
            "awaiting_proof" => Some(BetStatus::AwaitingProof),
            "voting" => Some(BetStatus::Voting),
            "resolved" => Some(BetStatus::Resolved),
            "void" => Some(BetStatus::Void),
            _ => None,
        }
    }

    /// Position along the forward chain. `Void` sits outside it.
    pub fn rank(&self) -> Option<u8> {
        match self {
            BetStatus::Draft => Some(0),
            BetStatus::Pending => Some(1),
            BetStatus::Locked => Some(2),
            BetStatus::AwaitingProof => Some(3),
            BetStatus::Voting => Some(4),
            BetStatus::Resolved => Some(5),
            BetStatus::Void => None,
        }
    }

    /// Sides can still be taken
    pub fn is_open(&self) -> bool {
        matches!(self, BetStatus::Draft | BetStatus::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BetStatus::Resolved | BetStatus::Void)
    }
}

impl std::fmt::Display for BetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the outcome of a bet gets decided
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProofType {
    Vote,
    Arbiter,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub user_id: UserId,
    pub side: Side,
    pub accepted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Proof {
    pub submitted_by: UserId,
    pub text: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vote {
    pub voter_id: UserId,
    pub side: Side,
    pub cast_at: DateTime<Utc>,
}

/// Two-sided wager inside a group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bet {
    pub id: BetId,
    pub group_id: GroupId,
    pub creator_id: UserId,
    pub title: String,
    pub description: String,
    pub side_a: String,
    pub side_b: String,
    pub stake: u64,
    pub event_date: DateTime<Utc>,
    pub status: BetStatus,
    pub proof_type: ProofType,
    pub arbiter_id: Option<UserId>,
    pub winner: Option<Side>,
    pub participants: Vec<Participant>,
    pub proof: Option<Proof>,
    pub votes: Vec<Vote>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Bet {
    pub fn participant(&self, user_id: &UserId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.user_id == user_id)
    }

    pub fn is_participant(&self, user_id: &UserId) -> bool {
        self.participant(user_id).is_some()
    }

    pub fn side_taken(&self, side: Side) -> bool {
        self.participants.iter().any(|p| p.side == side)
    }

    pub fn side_label(&self, side: Side) -> &str {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }
}

/// Input for creating a bet
#[derive(Debug, Clone, Deserialize)]
pub struct NewBet {
    pub group_id: GroupId,
    pub creator_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub side_a: String,
    pub side_b: String,
    pub stake: u64,
    pub event_date: DateTime<Utc>,
    pub proof_type: ProofType,
    #[serde(default)]
    pub arbiter_id: Option<UserId>,
}

/// Immutable settlement record. Positive amount = net gain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub user_id: UserId,
    pub bet_id: BetId,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a resolution request
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Settled {
        winner: Side,
        entries: Vec<LedgerEntry>,
    },
    /// Bet was resolved earlier; nothing changed.
    AlreadyResolved,
}

impl Resolution {
    pub fn entries(&self) -> &[LedgerEntry] {
        match self {
            Resolution::Settled { entries, .. } => entries,
            Resolution::AlreadyResolved => &[],
        }
    }
}
