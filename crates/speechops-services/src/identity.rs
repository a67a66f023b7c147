//! Operator identity lookup
//!
//! The credential validator authenticates against an injected read-only
//! lookup rather than a global user table. The in-memory implementation
//! holds the single configured operator record; it stands in for a real
//! credential store and keeps plaintext secrets, which is an explicitly
//! flagged stub pending password-hash storage.

use std::collections::HashMap;

/// A known operator: username, shared secret, and role set.
/// Read-only after startup.
#[derive(Debug, Clone)]
pub struct IdentityRecord {
    pub username: String,
    pub secret: String,
    pub roles: Vec<String>,
}

/// Read-only identity lookup consulted by the credential validator.
pub trait IdentityStore: Send + Sync {
    fn lookup(&self, username: &str) -> Option<IdentityRecord>;
}

/// In-memory store over a fixed set of records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityStore {
    records: HashMap<String, IdentityRecord>,
}

impl InMemoryIdentityStore {
    pub fn new(records: Vec<IdentityRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.username.clone(), record))
                .collect(),
        }
    }

    /// Store holding exactly one operator record.
    pub fn single(record: IdentityRecord) -> Self {
        Self::new(vec![record])
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn lookup(&self, username: &str) -> Option<IdentityRecord> {
        self.records.get(username).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> IdentityRecord {
        IdentityRecord {
            username: "admin".to_string(),
            secret: "admin123".to_string(),
            roles: vec!["Admin".to_string()],
        }
    }

    #[test]
    fn test_lookup_exact_username_match() {
        let store = InMemoryIdentityStore::single(admin());
        assert!(store.lookup("admin").is_some());
        // Usernames are case-sensitive
        assert!(store.lookup("Admin").is_none());
        assert!(store.lookup("nobody").is_none());
    }

    #[test]
    fn test_lookup_returns_roles() {
        let store = InMemoryIdentityStore::single(admin());
        let record = store.lookup("admin").expect("record");
        assert_eq!(record.roles, vec!["Admin".to_string()]);
    }
}
