//! User Registry
//! Mission: Hold user records, looked up by id or email

use crate::wager::error::{WagerError, WagerResult};
use crate::wager::models::{User, UserId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct UserRegistry {
    users: HashMap<UserId, User>,
    by_email: HashMap<String, UserId>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        email: &str,
        display_name: &str,
        avatar: Option<String>,
        now: DateTime<Utc>,
    ) -> WagerResult<User> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(WagerError::InvalidInput {
                field: "email",
                reason: "must be an address".to_string(),
            });
        }
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(WagerError::InvalidInput {
                field: "display_name",
                reason: "must not be blank".to_string(),
            });
        }
        if self.by_email.contains_key(&email) {
            return Err(WagerError::EmailTaken { email });
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.clone(),
            display_name: display_name.to_string(),
            avatar,
            created_at: now,
        };
        self.by_email.insert(email, user.id);
        self.users.insert(user.id, user.clone());

        info!("✅ Created user: {} ({})", user.display_name, user.id);
        Ok(user)
    }

    pub fn get(&self, user_id: &UserId) -> Option<&User> {
        self.users.get(user_id)
    }

    pub fn get_by_email(&self, email: &str) -> Option<&User> {
        self.by_email
            .get(&normalize_email(email))
            .and_then(|id| self.users.get(id))
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.users.contains_key(user_id)
    }

    /// Avatar is the only mutable user field.
    pub fn update_avatar(&mut self, user_id: &UserId, avatar: Option<String>) -> WagerResult<User> {
        let user = self
            .users
            .get_mut(user_id)
            .ok_or(WagerError::UserNotFound { user_id: *user_id })?;
        user.avatar = avatar;
        Ok(user.clone())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_lookup_user() {
        let mut users = UserRegistry::new();
        let alice = users
            .create("Alice@Example.com ", "Alice", None, Utc::now())
            .unwrap();

        assert_eq!(alice.email, "alice@example.com");
        assert_eq!(users.get(&alice.id), Some(&alice));
        assert_eq!(users.get_by_email("ALICE@example.com"), Some(&alice));
        assert!(users.get_by_email("bob@example.com").is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let mut users = UserRegistry::new();
        users.create("a@x.io", "A", None, Utc::now()).unwrap();

        let err = users.create("A@X.IO", "Other", None, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            WagerError::EmailTaken {
                email: "a@x.io".to_string()
            }
        );
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn test_invalid_fields_rejected() {
        let mut users = UserRegistry::new();
        assert!(matches!(
            users.create("not-an-email", "A", None, Utc::now()),
            Err(WagerError::InvalidInput { field: "email", .. })
        ));
        assert!(matches!(
            users.create("a@x.io", "   ", None, Utc::now()),
            Err(WagerError::InvalidInput {
                field: "display_name",
                ..
            })
        ));
        assert!(users.is_empty());
    }

    #[test]
    fn test_update_avatar() {
        let mut users = UserRegistry::new();
        let user = users.create("a@x.io", "A", None, Utc::now()).unwrap();

        let updated = users
            .update_avatar(&user.id, Some("avatars/a.png".to_string()))
            .unwrap();
        assert_eq!(updated.avatar.as_deref(), Some("avatars/a.png"));
        assert_eq!(updated.email, user.email);

        let missing = Uuid::new_v4();
        assert_eq!(
            users.update_avatar(&missing, None),
            Err(WagerError::UserNotFound { user_id: missing })
        );
    }
}
