//! Group Registry
//! Mission: Hold groups and membership, issue invite codes

use crate::wager::error::{WagerError, WagerResult};
use crate::wager::models::{Group, GroupId, UserId};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

const INVITE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MAX_CODE_ATTEMPTS: usize = 32;

/// Allowed invite code lengths.
pub const INVITE_CODE_LEN_RANGE: std::ops::RangeInclusive<usize> = 4..=16;

/// Draw an invite code not rejected by `taken`.
pub fn generate_invite_code<R: Rng>(
    rng: &mut R,
    len: usize,
    taken: impl Fn(&str) -> bool,
) -> WagerResult<String> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code: String = (0..len)
            .map(|_| INVITE_CHARSET[rng.gen_range(0..INVITE_CHARSET.len())] as char)
            .collect();
        if !taken(&code) {
            return Ok(code);
        }
    }
    Err(WagerError::InviteCodeExhausted {
        attempts: MAX_CODE_ATTEMPTS,
    })
}

pub fn normalize_invite_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub struct GroupRegistry {
    groups: Vec<Group>,
    index: HashMap<GroupId, usize>,
    by_code: HashMap<String, GroupId>,
    code_len: usize,
    rng: StdRng,
}

impl GroupRegistry {
    pub fn new(code_len: usize) -> Self {
        Self::with_rng(code_len, StdRng::from_entropy())
    }

    /// `code_len` is clamped into `INVITE_CODE_LEN_RANGE`.
    pub fn with_rng(code_len: usize, rng: StdRng) -> Self {
        let clamped = code_len.clamp(*INVITE_CODE_LEN_RANGE.start(), *INVITE_CODE_LEN_RANGE.end());
        if clamped != code_len {
            warn!(requested = code_len, used = clamped, "Invite code length out of range");
        }
        Self {
            groups: Vec::new(),
            index: HashMap::new(),
            by_code: HashMap::new(),
            code_len: clamped,
            rng,
        }
    }

    pub fn create(
        &mut self,
        name: &str,
        creator_id: UserId,
        now: DateTime<Utc>,
    ) -> WagerResult<Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WagerError::InvalidInput {
                field: "name",
                reason: "must not be blank".to_string(),
            });
        }

        let by_code = &self.by_code;
        let invite_code =
            generate_invite_code(&mut self.rng, self.code_len, |c| by_code.contains_key(c))?;

        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            creator_id,
            invite_code: invite_code.clone(),
            members: vec![creator_id],
            created_at: now,
        };

        self.by_code.insert(invite_code, group.id);
        self.index.insert(group.id, self.groups.len());
        self.groups.push(group.clone());

        info!(
            group_id = %group.id,
            invite_code = %group.invite_code,
            "👥 Created group: {}",
            group.name
        );
        Ok(group)
    }

    /// Add `user_id` to the group behind `code`. Membership is untouched on failure.
    pub fn join(&mut self, code: &str, user_id: UserId) -> WagerResult<Group> {
        let code = normalize_invite_code(code);
        let group_id = *self
            .by_code
            .get(&code)
            .ok_or(WagerError::UnknownInviteCode { code })?;
        let group = self.get_mut(&group_id)?;

        if group.is_member(&user_id) {
            return Err(WagerError::AlreadyMember { group_id, user_id });
        }
        group.members.push(user_id);

        info!(group_id = %group_id, user_id = %user_id, "🤝 Joined group");
        Ok(group.clone())
    }

    pub fn get(&self, group_id: &GroupId) -> Option<&Group> {
        self.index.get(group_id).map(|&i| &self.groups[i])
    }

    fn get_mut(&mut self, group_id: &GroupId) -> WagerResult<&mut Group> {
        let i = *self.index.get(group_id).ok_or(WagerError::GroupNotFound {
            group_id: *group_id,
        })?;
        Ok(&mut self.groups[i])
    }

    /// Groups the user belongs to, in creation order.
    pub fn for_user(&self, user_id: &UserId) -> Vec<Group> {
        self.groups
            .iter()
            .filter(|g| g.is_member(user_id))
            .cloned()
            .collect()
    }

    pub fn is_member(&self, group_id: &GroupId, user_id: &UserId) -> WagerResult<bool> {
        self.get(group_id)
            .map(|g| g.is_member(user_id))
            .ok_or(WagerError::GroupNotFound {
                group_id: *group_id,
            })
    }

    pub fn code_len(&self) -> usize {
        self.code_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn registry() -> GroupRegistry {
        GroupRegistry::with_rng(6, StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_create_group_includes_creator() {
        let mut groups = registry();
        let creator = Uuid::new_v4();
        let group = groups.create("Poker Night", creator, Utc::now()).unwrap();

        assert_eq!(group.members, vec![creator]);
        assert_eq!(group.invite_code.len(), 6);
        assert!(group
            .invite_code
            .bytes()
            .all(|b| INVITE_CHARSET.contains(&b)));
        assert_eq!(groups.get(&group.id), Some(&group));
    }

    #[test]
    fn test_join_with_code_appends_member() {
        let mut groups = registry();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let group = groups.create("Office", alice, Utc::now()).unwrap();

        let joined = groups
            .join(&format!(" {} ", group.invite_code.to_lowercase()), bob)
            .unwrap();
        assert_eq!(joined.members, vec![alice, bob]);
        assert_eq!(groups.for_user(&bob).len(), 1);
    }

    #[test]
    fn test_join_unknown_code_leaves_membership() {
        let mut groups = registry();
        let alice = Uuid::new_v4();
        let group = groups.create("Office", alice, Utc::now()).unwrap();

        let err = groups.join("NOPE42", Uuid::new_v4()).unwrap_err();
        assert_eq!(
            err,
            WagerError::UnknownInviteCode {
                code: "NOPE42".to_string()
            }
        );
        assert_eq!(groups.get(&group.id).unwrap().members, vec![alice]);
    }

    #[test]
    fn test_join_twice_is_refused() {
        let mut groups = registry();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let group = groups.create("Office", alice, Utc::now()).unwrap();

        groups.join(&group.invite_code, bob).unwrap();
        let err = groups.join(&group.invite_code, bob).unwrap_err();
        assert_eq!(
            err,
            WagerError::AlreadyMember {
                group_id: group.id,
                user_id: bob
            }
        );
        assert_eq!(groups.get(&group.id).unwrap().members, vec![alice, bob]);

        // Creator is already a member too
        assert!(groups.join(&group.invite_code, alice).is_err());
    }

    #[test]
    fn test_invite_codes_unique_across_groups() {
        let mut groups = GroupRegistry::with_rng(4, StdRng::seed_from_u64(1));
        let creator = Uuid::new_v4();
        let mut codes = std::collections::HashSet::new();
        for i in 0..20 {
            let g = groups.create(&format!("g{}", i), creator, Utc::now()).unwrap();
            assert!(codes.insert(g.invite_code));
        }
    }

    #[test]
    fn test_code_length_clamped() {
        let mut short = GroupRegistry::with_rng(0, StdRng::seed_from_u64(5));
        assert_eq!(short.code_len(), 4);
        let creator = Uuid::new_v4();
        let first = short.create("First", creator, Utc::now()).unwrap();
        let second = short.create("Second", creator, Utc::now()).unwrap();
        assert_eq!(first.invite_code.len(), 4);
        assert_ne!(first.invite_code, second.invite_code);

        // A blank code never matches a real group
        let err = short.join("   ", Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, WagerError::UnknownInviteCode { .. }));

        assert_eq!(GroupRegistry::with_rng(40, StdRng::seed_from_u64(5)).code_len(), 16);
    }

    #[test]
    fn test_generate_code_retries_on_collision() {
        let mut rng = StdRng::seed_from_u64(3);
        let calls = Cell::new(0);
        let code = generate_invite_code(&mut rng, 6, |_| {
            calls.set(calls.get() + 1);
            calls.get() == 1
        })
        .unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(code.len(), 6);
    }

    #[test]
    fn test_generate_code_gives_up() {
        let mut rng = StdRng::seed_from_u64(3);
        let err = generate_invite_code(&mut rng, 6, |_| true).unwrap_err();
        assert_eq!(
            err,
            WagerError::InviteCodeExhausted {
                attempts: MAX_CODE_ATTEMPTS
            }
        );
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut groups = registry();
        let creator = Uuid::new_v4();
        assert!(groups.create("  ", creator, Utc::now()).is_err());
        assert!(groups.for_user(&creator).is_empty());
    }
}
