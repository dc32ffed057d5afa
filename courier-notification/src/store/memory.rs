use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::models::{NewNotification, Notification, NotificationStatus};
use crate::store::{NotificationStore, StoreError, StoreResult};

/// Reference store: a mutex-guarded map.
///
/// Ids are UUIDv7, so id-descending order agrees with creation order even
/// when two saves land on the same timestamp tick. Each operation holds the
/// lock for its full duration, which gives the atomicity the store contract
/// requires; concurrent updates to the same id are last-writer-wins but
/// each write is internally consistent.
#[derive(Default)]
pub struct MemoryNotificationStore {
    records: Mutex<HashMap<Uuid, Notification>>,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<Uuid, Notification>>> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    fn ordered_for_recipient(
        records: &HashMap<Uuid, Notification>,
        recipient_id: &str,
    ) -> Vec<Notification> {
        let mut items: Vec<Notification> = records
            .values()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        items
    }
}

impl NotificationStore for MemoryNotificationStore {
    fn save(&self, candidate: NewNotification) -> StoreResult<Notification> {
        let mut records = self.lock()?;
        let now = Utc::now();
        let notification = Notification {
            id: Uuid::now_v7(),
            title: candidate.title,
            message: candidate.message,
            recipient_id: candidate.recipient_id,
            status: NotificationStatus::Unread,
            kind: candidate.kind,
            created_at: now,
            updated_at: now,
        };
        records.insert(notification.id, notification.clone());
        Ok(notification)
    }

    fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Notification>> {
        Ok(self.lock()?.get(&id).cloned())
    }

    fn find_by_recipient(&self, recipient_id: &str) -> StoreResult<Vec<Notification>> {
        let records = self.lock()?;
        Ok(Self::ordered_for_recipient(&records, recipient_id))
    }

    fn find_by_recipient_page(
        &self,
        recipient_id: &str,
        offset: usize,
        limit: usize,
    ) -> StoreResult<(Vec<Notification>, usize)> {
        let records = self.lock()?;
        let all = Self::ordered_for_recipient(&records, recipient_id);
        let total = all.len();
        let page = all.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    fn count_by_recipient_and_status(
        &self,
        recipient_id: &str,
        status: NotificationStatus,
    ) -> StoreResult<usize> {
        let records = self.lock()?;
        Ok(records
            .values()
            .filter(|n| n.recipient_id == recipient_id && n.status == status)
            .count())
    }

    fn update(
        &self,
        id: Uuid,
        mutate: &mut dyn FnMut(&mut Notification),
    ) -> StoreResult<Notification> {
        let mut records = self.lock()?;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound)?;

        let immutable = (record.id, record.recipient_id.clone(), record.created_at);
        mutate(record);
        (record.id, record.recipient_id, record.created_at) = immutable;
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.lock()?.remove(&id).is_some())
    }

    fn exists_by_id(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.lock()?.contains_key(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationType;

    fn candidate(recipient: &str) -> NewNotification {
        NewNotification {
            title: "title".into(),
            message: "message".into(),
            recipient_id: recipient.into(),
            kind: NotificationType::Info,
        }
    }

    #[test]
    fn save_assigns_id_timestamps_and_unread_status() {
        let store = MemoryNotificationStore::new();
        let saved = store.save(candidate("u1")).unwrap();

        assert!(!saved.id.is_nil());
        assert_eq!(saved.status, NotificationStatus::Unread);
        assert_eq!(saved.created_at, saved.updated_at);
        assert_eq!(store.find_by_id(saved.id).unwrap(), Some(saved));
    }

    #[test]
    fn saves_never_share_an_id() {
        let store = MemoryNotificationStore::new();
        let a = store.save(candidate("u1")).unwrap();
        let b = store.save(candidate("u1")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn recipient_listing_is_newest_first() {
        let store = MemoryNotificationStore::new();
        let first = store.save(candidate("u1")).unwrap();
        let second = store.save(candidate("u1")).unwrap();
        store.save(candidate("other")).unwrap();

        let listed = store.find_by_recipient("u1").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[test]
    fn page_beyond_data_is_empty_with_correct_total() {
        let store = MemoryNotificationStore::new();
        store.save(candidate("u1")).unwrap();
        store.save(candidate("u1")).unwrap();

        let (page, total) = store.find_by_recipient_page("u1", 10, 5).unwrap();
        assert!(page.is_empty());
        assert_eq!(total, 2);
    }

    #[test]
    fn update_refreshes_updated_at_and_keeps_immutable_fields() {
        let store = MemoryNotificationStore::new();
        let saved = store.save(candidate("u1")).unwrap();

        let updated = store
            .update(saved.id, &mut |n| {
                n.status = NotificationStatus::Read;
                n.recipient_id = "hijacked".into();
            })
            .unwrap();

        assert_eq!(updated.status, NotificationStatus::Read);
        assert_eq!(updated.recipient_id, "u1");
        assert_eq!(updated.created_at, saved.created_at);
        assert!(updated.updated_at >= saved.updated_at);
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let store = MemoryNotificationStore::new();
        let err = store.update(Uuid::now_v7(), &mut |_| {}).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn delete_removes_and_reports() {
        let store = MemoryNotificationStore::new();
        let saved = store.save(candidate("u1")).unwrap();

        assert!(store.delete_by_id(saved.id).unwrap());
        assert!(!store.exists_by_id(saved.id).unwrap());
        assert!(!store.delete_by_id(saved.id).unwrap());
    }

    #[test]
    fn count_by_status_tracks_reads() {
        let store = MemoryNotificationStore::new();
        let a = store.save(candidate("u1")).unwrap();
        store.save(candidate("u1")).unwrap();

        assert_eq!(
            store
                .count_by_recipient_and_status("u1", NotificationStatus::Unread)
                .unwrap(),
            2
        );

        store
            .update(a.id, &mut |n| n.status = n.status.on_read())
            .unwrap();

        assert_eq!(
            store
                .count_by_recipient_and_status("u1", NotificationStatus::Unread)
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .count_by_recipient_and_status("u1", NotificationStatus::Read)
                .unwrap(),
            1
        );
    }
}
