use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::collections::{hash_map::Entry, HashMap};
use std::sync::RwLock;

/// In-memory username -> Argon2 PHC string map. Not persisted.
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: RwLock<HashMap<String, String>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Ok(false)` when the username is already taken.
    pub fn register(&self, username: &str, password: &str) -> Result<bool> {
        if self.read()?.contains_key(username) {
            return Ok(false);
        }
        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("hashing password: {e}"))?
            .to_string();

        let mut users = self
            .users
            .write()
            .map_err(|_| anyhow!("user registry lock poisoned"))?;
        match users.entry(username.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(phc);
                Ok(true)
            }
        }
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        let Some(phc) = self.read()?.get(username).cloned() else {
            return Ok(false);
        };
        let parsed = PasswordHash::new(&phc).map_err(|e| anyhow!("stored hash unreadable: {e}"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, String>>> {
        self.users
            .read()
            .map_err(|_| anyhow!("user registry lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_authenticate() {
        let users = UserRegistry::new();
        assert!(users.register("alice", "hunter2").unwrap());
        assert!(users.authenticate("alice", "hunter2").unwrap());
        assert!(!users.authenticate("alice", "hunter3").unwrap());
    }

    #[test]
    fn duplicate_username_is_refused() {
        let users = UserRegistry::new();
        assert!(users.register("bob", "one").unwrap());
        assert!(!users.register("bob", "two").unwrap());
        assert!(users.authenticate("bob", "one").unwrap());
        assert!(!users.authenticate("bob", "two").unwrap());
    }

    #[test]
    fn unknown_user_fails() {
        let users = UserRegistry::new();
        assert!(!users.authenticate("nobody", "x").unwrap());
    }

    #[test]
    fn passwords_are_not_stored_in_clear() {
        let users = UserRegistry::new();
        users.register("carol", "plaintext").unwrap();
        let stored = users.read().unwrap().get("carol").cloned().unwrap();
        assert!(stored.starts_with("$argon2"));
        assert!(!stored.contains("plaintext"));
    }
}
