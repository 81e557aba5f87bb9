mod user;

pub use user::*;

/// Id carried by a record that has not been stored yet.
pub const UNASSIGNED_ID: u64 = 0;
