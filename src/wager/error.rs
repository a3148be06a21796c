//! Wager domain errors

use crate::wager::models::{BetId, BetStatus, GroupId, Side, UserId, MAX_STAKE};

#[derive(Debug, Clone, PartialEq)]
pub enum WagerError {
    UserNotFound { user_id: UserId },
    GroupNotFound { group_id: GroupId },
    BetNotFound { bet_id: BetId },
    EmailTaken { email: String },
    UnknownInviteCode { code: String },
    AlreadyMember { group_id: GroupId, user_id: UserId },
    NotGroupMember { group_id: GroupId, user_id: UserId },
    /// Blank or malformed field.
    InvalidInput { field: &'static str, reason: String },
    InvalidStake { stake: u64 },
    MissingArbiter,
    /// Operation not allowed in the bet's current status.
    InvalidState {
        bet_id: BetId,
        status: BetStatus,
        action: &'static str,
    },
    DuplicateParticipant { bet_id: BetId, user_id: UserId },
    SideTaken { bet_id: BetId, side: Side },
    NotParticipant { bet_id: BetId, user_id: UserId },
    NotArbiter { bet_id: BetId, user_id: UserId },
    InvalidTransition { from: BetStatus, to: BetStatus },
    /// Could not draw an unused invite code.
    InviteCodeExhausted { attempts: usize },
}

impl std::fmt::Display for WagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserNotFound { user_id } => write!(f, "User {} not found", user_id),
            Self::GroupNotFound { group_id } => write!(f, "Group {} not found", group_id),
            Self::BetNotFound { bet_id } => write!(f, "Bet {} not found", bet_id),
            Self::EmailTaken { email } => write!(f, "Email {} is already registered", email),
            Self::UnknownInviteCode { code } => write!(f, "Unknown invite code '{}'", code),
            Self::AlreadyMember { group_id, user_id } => {
                write!(f, "User {} is already a member of group {}", user_id, group_id)
            }
            Self::NotGroupMember { group_id, user_id } => {
                write!(f, "User {} is not a member of group {}", user_id, group_id)
            }
            Self::InvalidInput { field, reason } => write!(f, "Invalid {}: {}", field, reason),
            Self::InvalidStake { stake } => {
                write!(f, "Stake must be between 1 and {}, got {}", MAX_STAKE, stake)
            }
            Self::MissingArbiter => write!(f, "Arbiter bets require an arbiter"),
            Self::InvalidState {
                bet_id,
                status,
                action,
            } => write!(f, "Cannot {} bet {} while it is {}", action, bet_id, status),
            Self::DuplicateParticipant { bet_id, user_id } => {
                write!(f, "User {} already participates in bet {}", user_id, bet_id)
            }
            Self::SideTaken { bet_id, side } => {
                write!(f, "Side {} of bet {} is already taken", side, bet_id)
            }
            Self::NotParticipant { bet_id, user_id } => {
                write!(f, "User {} does not participate in bet {}", user_id, bet_id)
            }
            Self::NotArbiter { bet_id, user_id } => {
                write!(f, "User {} is not the arbiter of bet {}", user_id, bet_id)
            }
            Self::InvalidTransition { from, to } => {
                write!(f, "Invalid status transition {} -> {}", from, to)
            }
            Self::InviteCodeExhausted { attempts } => {
                write!(f, "No unused invite code after {} attempts", attempts)
            }
        }
    }
}

impl std::error::Error for WagerError {}

pub type WagerResult<T> = Result<T, WagerError>;
