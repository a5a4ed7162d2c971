//! Account directory.
//!
//! Accounts live outside this crate; the economy only needs to know whether
//! a user exists and what to call them on a leaderboard.

use std::collections::HashMap;

use uuid::Uuid;

use crate::storage::config::AccountEntry;

/// Read-only view of the account system.
pub trait AccountDirectory: Send + Sync {
    /// Whether the user id belongs to a known account
    fn exists(&self, user_id: Uuid) -> bool;

    /// Display name of a known account
    fn username(&self, user_id: Uuid) -> Option<String>;
}

/// Account directory held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccounts {
    usernames: HashMap<Uuid, String>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the directory from the `[[accounts]]` config entries.
    pub fn from_config(entries: &[AccountEntry]) -> Self {
        let mut accounts = Self::new();
        for entry in entries {
            accounts.insert(entry.id, &entry.username);
        }
        accounts
    }

    /// Add or rename an account.
    pub fn insert(&mut self, user_id: Uuid, username: &str) {
        self.usernames.insert(user_id, username.to_string());
    }

    /// Resolve a username, case-insensitively.
    pub fn find_by_username(&self, username: &str) -> Option<Uuid> {
        self.usernames
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(username))
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.usernames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usernames.is_empty()
    }
}

impl AccountDirectory for InMemoryAccounts {
    fn exists(&self, user_id: Uuid) -> bool {
        self.usernames.contains_key(&user_id)
    }

    fn username(&self, user_id: Uuid) -> Option<String> {
        self.usernames.get(&user_id).cloned()
    }
}
