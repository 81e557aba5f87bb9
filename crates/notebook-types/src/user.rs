use std::fmt;

use serde::{Deserialize, Serialize};

use crate::UNASSIGNED_ID;

/// A single notebook entry.
///
/// The same shape doubles as an update patch: empty string fields in a patch
/// mean "leave the stored value alone", and the patch's `id` is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl User {
    /// Creates a record that has not been stored yet.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: UNASSIGNED_ID,
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: phone.into(),
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    pub fn is_stored(&self) -> bool {
        self.id != UNASSIGNED_ID
    }

    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => String::new(),
        }
    }

    /// Names of the fields that are blank, in declaration order.
    ///
    /// All three are required for a new record.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Overwrites every field for which `patch` carries a non-empty value.
    pub fn apply_patch(&mut self, patch: &User) {
        if !patch.first_name.is_empty() {
            self.first_name = patch.first_name.clone();
        }
        if !patch.last_name.is_empty() {
            self.last_name = patch.last_name.clone();
        }
        if !patch.phone.is_empty() {
            self.phone = patch.phone.clone();
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.full_name(), self.phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_unassigned() {
        let user = User::new("Ann", "Lee", "555");
        assert_eq!(user.id, UNASSIGNED_ID);
        assert!(!user.is_stored());
        assert!(user.with_id(3).is_stored());
    }

    #[test]
    fn test_apply_patch_skips_empty_fields() {
        let mut user = User::new("Ann", "Lee", "555").with_id(1);
        user.apply_patch(&User::new("", "Park", ""));
        assert_eq!(user, User::new("Ann", "Park", "555").with_id(1));

        user.apply_patch(&User::new("", "", ""));
        assert_eq!(user, User::new("Ann", "Park", "555").with_id(1));
    }

    #[test]
    fn test_apply_patch_keeps_id() {
        let mut user = User::new("Ann", "Lee", "555").with_id(4);
        user.apply_patch(&User::new("Bo", "Kim", "777").with_id(9));
        assert_eq!(user.id, 4);
        assert_eq!(user.phone, "777");
    }

    #[test]
    fn test_missing_fields() {
        assert!(User::new("Ann", "Lee", "555").missing_fields().is_empty());
        assert_eq!(
            User::new("", "Lee", " ").missing_fields(),
            vec!["first name", "phone"]
        );
        assert_eq!(
            User::new("", "", "").missing_fields(),
            vec!["first name", "last name", "phone"]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(User::new("Ann", "Lee", "555").to_string(), "Ann Lee: 555");
        assert_eq!(User::new("", "Lee", "555").to_string(), "Lee: 555");
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(User::new("Ann", "Lee", "555").with_id(1)).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["first_name"], "Ann");
        assert_eq!(json["last_name"], "Lee");
        assert_eq!(json["phone"], "555");
    }
}
