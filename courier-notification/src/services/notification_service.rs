use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use courier_shared::errors::{AppError, AppResult, ErrorCode};
use courier_shared::types::{PageParams, Paginated};

use crate::channel::{recipient_address, DeliveryChannel, Subscription};
use crate::models::{CreateNotificationRequest, NewNotification, Notification, NotificationStatus};
use crate::store::NotificationStore;

/// The notification lifecycle engine.
///
/// Owns the status state machine and the persist-then-publish ordering of
/// creation. All durable state lives in the store; the engine itself is
/// stateless and safe to call from any number of request handlers.
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    channel: Arc<dyn DeliveryChannel>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>, channel: Arc<dyn DeliveryChannel>) -> Self {
        Self { store, channel }
    }

    /// Validate, persist, then announce the persisted record on the
    /// recipient's address. Any caller-supplied status is ignored: new
    /// records are always `UNREAD`. The record must exist durably before
    /// it is announced, so a client that misses the push can still find it
    /// via `list_for_recipient`/`get_by_id`; a failed publish is logged
    /// and dropped, never rolling back the committed create.
    pub fn create(&self, request: CreateNotificationRequest) -> AppResult<Notification> {
        let candidate = validate_create(&request)?;

        let notification = self.store.save(candidate)?;

        tracing::debug!(
            notification_id = %notification.id,
            recipient_id = %notification.recipient_id,
            "notification created"
        );

        self.publish_created(&notification);

        Ok(notification)
    }

    /// All of a recipient's notifications, newest first.
    pub fn list_for_recipient(&self, recipient_id: &str) -> AppResult<Vec<Notification>> {
        require_recipient(recipient_id)?;
        Ok(self.store.find_by_recipient(recipient_id)?)
    }

    /// One page of a recipient's notifications, newest first. A page index
    /// beyond the available data yields an empty page, not an error.
    pub fn list_for_recipient_paged(
        &self,
        recipient_id: &str,
        params: &PageParams,
    ) -> AppResult<Paginated<Notification>> {
        require_recipient(recipient_id)?;
        let (items, total) = self.store.find_by_recipient_page(
            recipient_id,
            params.offset() as usize,
            params.limit() as usize,
        )?;
        Ok(Paginated::new(items, total as u64, params))
    }

    pub fn get_by_id(&self, id: Uuid) -> AppResult<Notification> {
        self.store
            .find_by_id(id)?
            .ok_or_else(|| AppError::new(ErrorCode::NotificationNotFound, "notification not found"))
    }

    /// Idempotent: a record already `READ` stays `READ` and `updated_at`
    /// is still refreshed. Does not re-publish; the channel carries
    /// creation notices only.
    pub fn mark_as_read(&self, id: Uuid) -> AppResult<Notification> {
        let notification = self
            .store
            .update(id, &mut |n| n.status = n.status.on_read())?;

        tracing::debug!(notification_id = %id, "notification marked read");

        Ok(notification)
    }

    pub fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_by_id(id)? {
            return Err(AppError::new(
                ErrorCode::NotificationNotFound,
                "notification not found",
            ));
        }

        tracing::debug!(notification_id = %id, "notification deleted");

        Ok(())
    }

    pub fn unread_count(&self, recipient_id: &str) -> AppResult<u64> {
        require_recipient(recipient_id)?;
        let count = self
            .store
            .count_by_recipient_and_status(recipient_id, NotificationStatus::Unread)?;
        Ok(count as u64)
    }

    /// A live feed of creation notices for one recipient.
    pub fn subscribe_for_recipient(&self, recipient_id: &str) -> Subscription {
        self.channel.subscribe(&recipient_address(recipient_id))
    }

    fn publish_created(&self, notification: &Notification) {
        let payload = match serde_json::to_value(notification) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize notification payload");
                return;
            }
        };

        let address = recipient_address(&notification.recipient_id);

        // best effort: one retry, then drop; the persisted record is the
        // durable source of truth
        for attempt in 0..2 {
            match self.channel.publish(&address, &payload) {
                Ok(()) => {
                    tracing::debug!(
                        address = %address,
                        notification_id = %notification.id,
                        "notification published"
                    );
                    return;
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        address = %address,
                        attempt,
                        "failed to publish notification"
                    );
                }
            }
        }
    }
}

fn require_recipient(recipient_id: &str) -> AppResult<()> {
    if recipient_id.trim().is_empty() {
        return Err(AppError::with_details(
            ErrorCode::ValidationError,
            "invalid request",
            json!({
                "violations": [{ "field": "recipientId", "message": "must not be blank" }]
            }),
        ));
    }
    Ok(())
}

/// Explicit precondition checks, collecting every violation before any
/// store interaction.
fn validate_create(request: &CreateNotificationRequest) -> AppResult<NewNotification> {
    let mut violations = Vec::new();

    let blank = |s: &Option<String>| s.as_deref().map_or(true, |v| v.trim().is_empty());

    if blank(&request.title) {
        violations.push(json!({ "field": "title", "message": "must not be blank" }));
    }
    if blank(&request.message) {
        violations.push(json!({ "field": "message", "message": "must not be blank" }));
    }
    if blank(&request.recipient_id) {
        violations.push(json!({ "field": "recipientId", "message": "must not be blank" }));
    }
    if request.kind.is_none() {
        violations.push(json!({ "field": "type", "message": "is required" }));
    }

    // request.status is deliberately dropped here; creation always
    // normalizes to UNREAD
    if let (Some(title), Some(message), Some(recipient_id), Some(kind), true) = (
        request.title.clone(),
        request.message.clone(),
        request.recipient_id.clone(),
        request.kind,
        violations.is_empty(),
    ) {
        Ok(NewNotification {
            title,
            message,
            recipient_id,
            kind,
        })
    } else {
        Err(AppError::with_details(
            ErrorCode::ValidationError,
            "invalid notification",
            json!({ "violations": violations }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::memory::BroadcastDeliveryChannel;
    use crate::models::NotificationType;
    use crate::store::memory::MemoryNotificationStore;

    fn service() -> NotificationService {
        NotificationService::new(
            Arc::new(MemoryNotificationStore::new()),
            Arc::new(BroadcastDeliveryChannel::default()),
        )
    }

    fn create_request(recipient: &str) -> CreateNotificationRequest {
        CreateNotificationRequest {
            title: Some("Build failed".into()),
            message: Some("see logs".into()),
            recipient_id: Some(recipient.into()),
            kind: Some(NotificationType::Error),
            status: None,
        }
    }

    #[test]
    fn create_forces_unread_status() {
        let service = service();
        let mut request = create_request("u1");
        request.status = Some(NotificationStatus::Read);

        let created = service.create(request).unwrap();

        assert_eq!(created.status, NotificationStatus::Unread);
        assert_eq!(service.get_by_id(created.id).unwrap(), created);
    }

    #[test]
    fn create_collects_every_violation() {
        let service = service();
        let err = service
            .create(CreateNotificationRequest {
                title: Some("  ".into()),
                ..Default::default()
            })
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationError);
        let AppError::Known { details: Some(details), .. } = err else {
            panic!("expected structured validation error");
        };
        let violations = details["violations"].as_array().unwrap();
        let fields: Vec<&str> = violations
            .iter()
            .map(|v| v["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["title", "message", "recipientId", "type"]);
    }

    #[test]
    fn create_delivers_to_live_subscriber() {
        let service = service();
        let mut subscription = service.subscribe_for_recipient("u1");

        let created = service.create(create_request("u1")).unwrap();

        let payload = subscription.try_recv().unwrap();
        assert_eq!(payload, serde_json::to_value(&created).unwrap());
    }

    #[test]
    fn create_without_subscribers_still_succeeds() {
        let service = service();
        let created = service.create(create_request("offline")).unwrap();
        assert_eq!(service.unread_count("offline").unwrap(), 1);
        assert!(!created.id.is_nil());
    }

    #[test]
    fn unread_count_tracks_create_read_delete() {
        let service = service();
        let a = service.create(create_request("u1")).unwrap();
        let b = service.create(create_request("u1")).unwrap();
        service.create(create_request("someone-else")).unwrap();

        assert_eq!(service.unread_count("u1").unwrap(), 2);

        service.mark_as_read(a.id).unwrap();
        assert_eq!(service.unread_count("u1").unwrap(), 1);

        service.delete(b.id).unwrap();
        assert_eq!(service.unread_count("u1").unwrap(), 0);
        assert_eq!(service.unread_count("no-records").unwrap(), 0);
    }

    #[test]
    fn mark_as_read_is_idempotent_and_refreshes_updated_at() {
        let service = service();
        let created = service.create(create_request("u1")).unwrap();

        let first = service.mark_as_read(created.id).unwrap();
        assert_eq!(first.status, NotificationStatus::Read);

        let second = service.mark_as_read(created.id).unwrap();
        assert_eq!(second.status, NotificationStatus::Read);
        assert!(second.updated_at >= first.updated_at);
    }

    #[test]
    fn mark_as_read_does_not_republish() {
        let service = service();
        let created = service.create(create_request("u1")).unwrap();

        let mut subscription = service.subscribe_for_recipient("u1");
        service.mark_as_read(created.id).unwrap();

        assert!(subscription.try_recv().is_err());
    }

    #[test]
    fn mark_as_read_unknown_id_leaves_store_unchanged() {
        let service = service();
        service.create(create_request("u1")).unwrap();

        let err = service.mark_as_read(Uuid::now_v7()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotificationNotFound);

        let listed = service.list_for_recipient("u1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, NotificationStatus::Unread);
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let service = service();
        let created = service.create(create_request("u1")).unwrap();

        service.delete(created.id).unwrap();

        let err = service.get_by_id(created.id).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotificationNotFound);

        let err = service.delete(created.id).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotificationNotFound);
    }

    #[test]
    fn paged_listing_returns_newest_and_total() {
        let service = service();
        service.create(create_request("u2")).unwrap();
        let newest = service.create(create_request("u2")).unwrap();

        let params = PageParams { page: 0, size: 1 };
        let page = service.list_for_recipient_paged("u2", &params).unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, newest.id);
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn paged_listing_beyond_data_is_empty_not_an_error() {
        let service = service();
        service.create(create_request("u1")).unwrap();

        let params = PageParams { page: 9, size: 20 };
        let page = service.list_for_recipient_paged("u1", &params).unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
    }

    #[test]
    fn paged_listing_with_huge_page_index_is_empty() {
        let service = service();
        service.create(create_request("u1")).unwrap();

        let params = PageParams { page: u64::MAX, size: 100 };
        let page = service.list_for_recipient_paged("u1", &params).unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
    }

    #[test]
    fn list_rejects_blank_recipient() {
        let service = service();
        let err = service.list_for_recipient("  ").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }
}
