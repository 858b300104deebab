use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::users::{NewUser, UserRecord};

/// Lookup and creation of user accounts
///
/// `Ok(None)` means the user does not exist; `Err` is reserved for store
/// failures.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;

    /// # Errors
    /// A duplicate email surfaces as `DatabaseError::UniqueConstraintViolation`.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, AppError>;
}
