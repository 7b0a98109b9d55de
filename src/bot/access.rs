use std::collections::HashSet;
use std::sync::RwLock;

/// Decides who may talk to the bot.
pub trait AccessGate: Send + Sync {
    fn is_allowed(&self, user_id: i64) -> bool;
    /// Returns `true` if the user was newly granted access.
    fn grant(&self, user_id: i64) -> bool;
    /// Explicitly granted users, sorted.
    fn allowed(&self) -> Vec<i64>;
    fn invite_only(&self) -> bool;
}

/// In-memory allow-list, seeded with the admin ids. Grants are lost on
/// restart.
pub struct InviteList {
    invite_only: bool,
    users: RwLock<HashSet<i64>>,
}

impl InviteList {
    pub fn new(invite_only: bool, seed: impl IntoIterator<Item = i64>) -> Self {
        Self {
            invite_only,
            users: RwLock::new(seed.into_iter().collect()),
        }
    }
}

impl AccessGate for InviteList {
    fn is_allowed(&self, user_id: i64) -> bool {
        if !self.invite_only {
            return true;
        }
        self.users
            .read()
            .map(|users| users.contains(&user_id))
            .unwrap_or_else(|poisoned| poisoned.into_inner().contains(&user_id))
    }

    fn grant(&self, user_id: i64) -> bool {
        let mut users = self.users.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        users.insert(user_id)
    }

    fn allowed(&self) -> Vec<i64> {
        let users = self.users.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut ids: Vec<i64> = users.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn invite_only(&self) -> bool {
        self.invite_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_only_denies_strangers() {
        let gate = InviteList::new(true, [1, 2]);
        assert!(gate.is_allowed(1));
        assert!(!gate.is_allowed(3));
    }

    #[test]
    fn test_open_mode_allows_everyone() {
        let gate = InviteList::new(false, []);
        assert!(gate.is_allowed(12345));
        assert!(gate.allowed().is_empty());
    }

    #[test]
    fn test_grant_is_idempotent() {
        let gate = InviteList::new(true, [5]);
        assert!(gate.grant(9));
        assert!(!gate.grant(9));
        assert!(!gate.grant(5));
        assert!(gate.is_allowed(9));
        assert_eq!(gate.allowed(), vec![5, 9]);
    }
}
