use crate::error::CoreError;

use super::types::UserRecord;

/// Minimal storage operations the account flows need.
///
/// Implementations must make each call individually consistent; callers
/// that need check-then-write atomicity across calls (registration) hold
/// their own lock around the sequence.
pub trait UserBackend: Send + Sync {
    /// Exact, case-sensitive username lookup.
    fn get(&self, username: &str) -> Result<Option<UserRecord>, CoreError>;

    /// Insert or replace the record keyed by `record.username`.
    fn put(&self, record: UserRecord) -> Result<(), CoreError>;

    /// Every stored record, ordered by username.
    fn scan(&self) -> Result<Vec<UserRecord>, CoreError>;

    /// First record (in username order) whose email matches, ignoring ASCII
    /// case.
    fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, CoreError> {
        Ok(self.scan()?.into_iter().find(|r| r.has_email(email)))
    }
}
