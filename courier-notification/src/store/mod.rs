pub mod memory;

use uuid::Uuid;

use courier_shared::errors::{AppError, ErrorCode};

use crate::models::{NewNotification, Notification, NotificationStatus};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("notification not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => {
                AppError::new(ErrorCode::NotificationNotFound, "notification not found")
            }
            StoreError::Unavailable(reason) => {
                tracing::error!(reason = %reason, "notification store unavailable");
                AppError::internal("notification store unavailable")
            }
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable keyed storage for notifications.
///
/// The store owns identity and timestamps: `save` assigns `id`,
/// `created_at` and `updated_at` atomically with respect to concurrent
/// saves, and `update` refreshes `updated_at`. Recipient-scoped reads are
/// ordered `created_at` descending with ties broken by `id` descending so
/// ordering stays deterministic under coarse timestamp resolution.
pub trait NotificationStore: Send + Sync {
    /// Persist a candidate, assigning id and both timestamps.
    fn save(&self, candidate: NewNotification) -> StoreResult<Notification>;

    fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Notification>>;

    /// All of a recipient's notifications, newest first.
    fn find_by_recipient(&self, recipient_id: &str) -> StoreResult<Vec<Notification>>;

    /// One page of a recipient's notifications plus the total match count.
    fn find_by_recipient_page(
        &self,
        recipient_id: &str,
        offset: usize,
        limit: usize,
    ) -> StoreResult<(Vec<Notification>, usize)>;

    fn count_by_recipient_and_status(
        &self,
        recipient_id: &str,
        status: NotificationStatus,
    ) -> StoreResult<usize>;

    /// Apply `mutate` to the record and refresh `updated_at`. Writes to
    /// `id`, `recipient_id` and `created_at` are discarded: those fields
    /// are immutable after creation.
    fn update(
        &self,
        id: Uuid,
        mutate: &mut dyn FnMut(&mut Notification),
    ) -> StoreResult<Notification>;

    /// Hard-remove a record. Returns true if a record was removed.
    fn delete_by_id(&self, id: Uuid) -> StoreResult<bool>;

    fn exists_by_id(&self, id: Uuid) -> StoreResult<bool>;
}
