use notebook_types::User;
use regex::{Regex, RegexBuilder};

pub fn build_pattern(pattern: &str, case_sensitive: bool) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
}

/// Records whose first name, last name or phone matches `regex`.
pub fn search_users(users: Vec<User>, regex: &Regex) -> Vec<User> {
    users
        .into_iter()
        .filter(|u| {
            regex.is_match(&u.first_name)
                || regex.is_match(&u.last_name)
                || regex.is_match(&u.phone)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Vec<User> {
        vec![
            User::new("Ann", "Lee", "555-0101").with_id(1),
            User::new("Bo", "Kim", "555-0199").with_id(2),
            User::new("Cy", "Annersley", "777").with_id(3),
        ]
    }

    fn ids(users: &[User]) -> Vec<u64> {
        users.iter().map(|u| u.id).collect()
    }

    #[test]
    fn test_matches_any_field() {
        let found = search_users(users(), &build_pattern("ann", false).unwrap());
        assert_eq!(ids(&found), vec![1, 3]);

        let found = search_users(users(), &build_pattern("^555-01", false).unwrap());
        assert_eq!(ids(&found), vec![1, 2]);
    }

    #[test]
    fn test_case_sensitive() {
        let found = search_users(users(), &build_pattern("ann", true).unwrap());
        assert!(found.is_empty());
        let found = search_users(users(), &build_pattern("Ann", true).unwrap());
        assert_eq!(ids(&found), vec![1, 3]);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(build_pattern("(", false).is_err());
    }
}
