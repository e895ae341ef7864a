use dashmap::DashMap;

use crate::error::{Error, ErrorKind};
use crate::user::UserRecord;

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

// failures from a backing store are unexpected and surface unchanged
impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::from(ErrorKind::StoreFailure).with_source(err)
    }
}

pub trait CredentialStore: Send + Sync {
    fn get(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    fn put(&self, username: &str, record: UserRecord) -> Result<(), StoreError>;

    fn exists(&self, username: &str) -> Result<bool, StoreError>;

    fn list(&self) -> Result<Vec<String>, StoreError>;
}

pub struct MemoryCredentialStore {
    users: DashMap<String, UserRecord>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        MemoryCredentialStore {
            users: DashMap::new(),
        }
    }
}

impl std::default::Default for MemoryCredentialStore {
    fn default() -> Self {
        MemoryCredentialStore::new()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.get(username).map(|found| found.clone()))
    }

    fn put(&self, username: &str, record: UserRecord) -> Result<(), StoreError> {
        self.users.insert(String::from(username), record);

        Ok(())
    }

    fn exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.users.contains_key(username))
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.users.iter().map(|entry| entry.key().clone()).collect())
    }
}

#[cfg(test)]
mod test {
    use chrono::DateTime;

    use super::*;

    fn test_record(username: &str) -> UserRecord {
        UserRecord::create(
            username,
            format!("{}@example.com", username),
            String::from("$argon2id$..."),
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        )
    }

    #[test]
    fn put_then_get_returns_copy() {
        let store = MemoryCredentialStore::new();

        store.put("alice", test_record("alice")).unwrap();

        let found = store.get("alice").unwrap().expect("record exists");

        assert_eq!(found.username, "alice");
        assert!(store.exists("alice").unwrap());
        assert!(!store.exists("bob").unwrap());
    }

    #[test]
    fn put_overwrites_existing() {
        let store = MemoryCredentialStore::new();

        store.put("alice", test_record("alice")).unwrap();

        let mut updated = test_record("alice");
        updated.two_factor_enabled = true;

        store.put("alice", updated).unwrap();

        let found = store.get("alice").unwrap().expect("record exists");

        assert!(found.two_factor_enabled);
    }

    #[test]
    fn list_returns_all_usernames() {
        let store = MemoryCredentialStore::new();

        store.put("alice", test_record("alice")).unwrap();
        store.put("bob", test_record("bob")).unwrap();

        let mut names = store.list().unwrap();
        names.sort();

        assert_eq!(names, vec![String::from("alice"), String::from("bob")]);
    }
}
