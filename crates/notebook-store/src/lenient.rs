use notebook_types::{User, UNASSIGNED_ID};
use tracing::error;

use crate::repository::Repository;

/// Wraps a [`Repository`] so failures are logged instead of returned.
///
/// Each operation falls back to an empty or negative result when the
/// underlying store fails. A store that fails to load is never written.
pub struct LenientRepository<R> {
    inner: R,
}

impl<R: Repository> LenientRepository<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn find_all(&self) -> Vec<User> {
        self.inner.find_all().unwrap_or_else(|e| {
            error!("Failed to load records: {}", e);
            Vec::new()
        })
    }

    /// On failure the record comes back unsaved, with no id assigned.
    pub fn create(&self, user: User) -> User {
        match self.inner.create(user.clone()) {
            Ok(created) => created,
            Err(e) => {
                error!("Failed to create record: {}", e);
                user.with_id(UNASSIGNED_ID)
            }
        }
    }

    pub fn find_by_id(&self, id: u64) -> Option<User> {
        self.inner.find_by_id(id).unwrap_or_else(|e| {
            error!("Failed to look up record {}: {}", id, e);
            None
        })
    }

    pub fn update(&self, id: u64, patch: User) -> Option<User> {
        self.inner.update(id, patch).unwrap_or_else(|e| {
            error!("Failed to update record {}: {}", id, e);
            None
        })
    }

    pub fn delete(&self, id: u64) -> bool {
        self.inner.delete(id).unwrap_or_else(|e| {
            error!("Failed to delete record {}: {}", id, e);
            false
        })
    }

    pub fn read_all(&self) -> Vec<String> {
        self.inner.read_all().unwrap_or_else(|e| {
            error!("Failed to read store: {}", e);
            Vec::new()
        })
    }

    pub fn save_all(&self, lines: &[String]) {
        if let Err(e) = self.inner.save_all(lines) {
            error!("Failed to save store: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserRepository;
    use std::fs;
    use tempfile::TempDir;

    fn corrupt_store() -> (TempDir, LenientRepository<UserRepository>) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.txt");
        fs::write(&path, "1,Ann,Lee,555\nbroken\n").unwrap();
        let repo = LenientRepository::new(UserRepository::open(&path).unwrap());
        (dir, repo)
    }

    #[test]
    fn test_passes_through_on_success() {
        let dir = TempDir::new().unwrap();
        let repo = LenientRepository::new(UserRepository::open(dir.path().join("db.txt")).unwrap());

        let created = repo.create(User::new("Ann", "Lee", "555"));
        assert_eq!(created.id, 1);
        assert_eq!(repo.find_all(), vec![created.clone()]);
        assert_eq!(repo.find_by_id(1), Some(created));
        assert_eq!(repo.update(1, User::new("", "", "9")), Some(User::new("", "", "9")));
        assert!(repo.delete(1));
        assert!(repo.find_all().is_empty());
    }

    #[test]
    fn test_degrades_on_corrupt_store() {
        let (_dir, repo) = corrupt_store();
        let before = fs::read(repo.inner().path()).unwrap();

        assert!(repo.find_all().is_empty());
        assert_eq!(repo.find_by_id(1), None);
        assert_eq!(repo.update(1, User::new("X", "", "")), None);
        assert!(!repo.delete(1));

        let created = repo.create(User::new("Bo", "Kim", "777"));
        assert!(!created.is_stored());
        assert_eq!(created.first_name, "Bo");

        assert_eq!(fs::read(repo.inner().path()).unwrap(), before);
    }

    #[test]
    fn test_raw_access_ignores_corruption() {
        let (_dir, repo) = corrupt_store();
        assert_eq!(repo.read_all(), vec!["1,Ann,Lee,555", "broken"]);

        repo.save_all(&["2,Bo,Kim,777".to_string()]);
        assert_eq!(repo.find_all(), vec![User::new("Bo", "Kim", "777").with_id(2)]);
    }
}
