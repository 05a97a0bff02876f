//! Process-local storage backend.
//!
//! Keeps every table in one `RwLock`-guarded struct with auto-increment ids.
//! Used by tests and by `STORAGE_BACKEND=memory` deployments; all data is lost
//! on restart.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::database::{
    models::{
        Document, DocumentInput, DocumentType, NewTimeOffRequest, NewUser, Notification,
        NotificationInput, Schedule, ScheduleInput, Shift, ShiftInput, ShiftPatch, TimeOffRequest,
        TimeOffStatus, User, UserChanges,
    },
    repositories::{
        DocumentRepository, NotificationRepository, ScheduleRepository, ShiftRepository,
        TimeOffRepository, UserRepository,
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    schedules: Vec<Schedule>,
    shifts: Vec<Shift>,
    time_off: Vec<TimeOffRequest>,
    documents: Vec<Document>,
    notifications: Vec<Notification>,
    next_user_id: i64,
    next_schedule_id: i64,
    next_shift_id: i64,
    next_time_off_id: i64,
    next_document_id: i64,
    next_notification_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn build_shift(tables: &mut Tables, input: ShiftInput) -> Shift {
        Shift {
            id: next_id(&mut tables.next_shift_id),
            schedule_id: input.schedule_id,
            user_id: input.user_id,
            day: input.day,
            start_time: input.start_time,
            end_time: input.end_time,
            shift_type: input.shift_type,
            notes: input.notes,
            area: input.area,
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.read()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.read()?.users.clone())
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let mut tables = self.write()?;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(anyhow!("username {} already exists", user.username));
        }
        let user = User {
            id: next_id(&mut tables.next_user_id),
            username: user.username,
            password_hash: user.password_hash,
            name: user.name,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            last_login: None,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>> {
        let mut tables = self.write()?;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = Some(email);
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        Ok(Some(user.clone()))
    }

    async fn touch_last_login(&self, id: i64) -> Result<()> {
        let mut tables = self.write()?;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for MemoryStore {
    async fn create(&self, input: ScheduleInput, created_by: i64) -> Result<Schedule> {
        let mut tables = self.write()?;
        let schedule = Schedule {
            id: next_id(&mut tables.next_schedule_id),
            start_date: input.start_date,
            end_date: input.end_date,
            is_published: false,
            published_at: None,
            created_by,
            updated_at: Utc::now(),
        };
        tables.schedules.push(schedule.clone());
        Ok(schedule)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Schedule>> {
        Ok(self.read()?.schedules.iter().find(|s| s.id == id).cloned())
    }

    async fn find_overlapping(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Schedule>> {
        Ok(self
            .read()?
            .schedules
            .iter()
            .find(|s| s.overlaps(start, end))
            .cloned())
    }

    async fn mark_published(&self, id: i64) -> Result<Option<Schedule>> {
        let mut tables = self.write()?;
        let Some(schedule) = tables.schedules.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        let now = Utc::now();
        schedule.is_published = true;
        schedule.published_at = Some(now);
        schedule.updated_at = now;
        Ok(Some(schedule.clone()))
    }
}

#[async_trait]
impl ShiftRepository for MemoryStore {
    async fn create(&self, input: ShiftInput) -> Result<Shift> {
        let mut tables = self.write()?;
        let shift = Self::build_shift(&mut tables, input);
        tables.shifts.push(shift.clone());
        Ok(shift)
    }

    async fn create_many(&self, inputs: Vec<ShiftInput>) -> Result<Vec<Shift>> {
        let mut tables = self.write()?;
        let shifts: Vec<Shift> = inputs
            .into_iter()
            .map(|input| Self::build_shift(&mut tables, input))
            .collect();
        tables.shifts.extend(shifts.iter().cloned());
        Ok(shifts)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Shift>> {
        Ok(self.read()?.shifts.iter().find(|s| s.id == id).cloned())
    }

    async fn list_by_schedule(&self, schedule_id: i64) -> Result<Vec<Shift>> {
        Ok(self
            .read()?
            .shifts
            .iter()
            .filter(|s| s.schedule_id == schedule_id)
            .cloned()
            .collect())
    }

    async fn list_by_schedule_and_user(
        &self,
        schedule_id: i64,
        user_id: i64,
    ) -> Result<Vec<Shift>> {
        Ok(self
            .read()?
            .shifts
            .iter()
            .filter(|s| s.schedule_id == schedule_id && s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, patch: ShiftPatch) -> Result<Option<Shift>> {
        let mut tables = self.write()?;
        let Some(shift) = tables.shifts.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        patch.apply(shift);
        Ok(Some(shift.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tables = self.write()?;
        let before = tables.shifts.len();
        tables.shifts.retain(|s| s.id != id);
        Ok(tables.shifts.len() < before)
    }
}

#[async_trait]
impl TimeOffRepository for MemoryStore {
    async fn create(&self, request: NewTimeOffRequest) -> Result<TimeOffRequest> {
        let mut tables = self.write()?;
        let now = Utc::now();
        let time_off = TimeOffRequest {
            id: next_id(&mut tables.next_time_off_id),
            user_id: request.user_id,
            request_type: request.request_type,
            start_date: request.start_date,
            end_date: request.end_date,
            duration: request.duration,
            status: TimeOffStatus::Pending,
            reason: request.reason,
            approved_by: None,
            created_at: now,
            updated_at: now,
        };
        tables.time_off.push(time_off.clone());
        Ok(time_off)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<TimeOffRequest>> {
        Ok(self.read()?.time_off.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, user_id: Option<i64>) -> Result<Vec<TimeOffRequest>> {
        Ok(self
            .read()?
            .time_off
            .iter()
            .rev()
            .filter(|r| user_id.is_none_or(|id| r.user_id == id))
            .cloned()
            .collect())
    }

    async fn list_approved_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeOffRequest>> {
        Ok(self
            .read()?
            .time_off
            .iter()
            .filter(|r| r.is_approved() && r.start_date <= end && r.end_date >= start)
            .cloned()
            .collect())
    }

    async fn set_status(
        &self,
        id: i64,
        status: TimeOffStatus,
        decided_by: i64,
    ) -> Result<Option<TimeOffRequest>> {
        let mut tables = self.write()?;
        let Some(request) = tables.time_off.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        request.status = status;
        request.approved_by = Some(decided_by);
        request.updated_at = Utc::now();
        Ok(Some(request.clone()))
    }
}

#[async_trait]
impl DocumentRepository for MemoryStore {
    async fn create(&self, input: DocumentInput, uploaded_by: i64) -> Result<Document> {
        let mut tables = self.write()?;
        let document = Document {
            id: next_id(&mut tables.next_document_id),
            user_id: input.user_id,
            document_type: input.document_type,
            period: input.period,
            filename: input.filename,
            file_data: input.file_data,
            uploaded_by,
            uploaded_at: Utc::now(),
        };
        tables.documents.push(document.clone());
        Ok(document)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Document>> {
        Ok(self.read()?.documents.iter().find(|d| d.id == id).cloned())
    }

    async fn list(
        &self,
        user_id: Option<i64>,
        document_type: Option<DocumentType>,
    ) -> Result<Vec<Document>> {
        Ok(self
            .read()?
            .documents
            .iter()
            .rev()
            .filter(|d| user_id.is_none_or(|id| d.user_id == id))
            .filter(|d| document_type.is_none_or(|t| d.document_type == t))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tables = self.write()?;
        let before = tables.documents.len();
        tables.documents.retain(|d| d.id != id);
        Ok(tables.documents.len() < before)
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn create(&self, input: NotificationInput) -> Result<Notification> {
        let mut tables = self.write()?;
        let notification = Notification {
            id: next_id(&mut tables.next_notification_id),
            user_id: input.user_id,
            notification_type: input.notification_type,
            message: input.message,
            is_read: false,
            data: input.data,
            created_at: Utc::now(),
        };
        tables.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>> {
        Ok(self
            .read()?
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: i64, user_id: i64) -> Result<bool> {
        let mut tables = self.write()?;
        match tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            Some(notification) => {
                notification.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        let mut tables = self.write()?;
        let mut changed = 0;
        for notification in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            notification.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{DayOfWeek, ShiftType, UserRole};
    use pretty_assertions::assert_eq;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            name: username.to_string(),
            email: None,
            role: UserRole::Employee,
            is_active: true,
        }
    }

    fn shift_input(user_id: i64) -> ShiftInput {
        ShiftInput {
            schedule_id: 1,
            user_id,
            day: DayOfWeek::Monday,
            start_time: "08:00".to_string(),
            end_time: "16:00".to_string(),
            shift_type: ShiftType::Regular,
            notes: None,
            area: None,
        }
    }

    #[tokio::test]
    async fn test_ids_increment_per_table() {
        let store = MemoryStore::default();
        let a = UserRepository::create(&store, new_user("a")).await.unwrap();
        let b = UserRepository::create(&store, new_user("b")).await.unwrap();
        let shift = ShiftRepository::create(&store, shift_input(a.id))
            .await
            .unwrap();

        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(shift.id, 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let store = MemoryStore::default();
        UserRepository::create(&store, new_user("a")).await.unwrap();

        assert!(UserRepository::create(&store, new_user("a")).await.is_err());
    }

    #[tokio::test]
    async fn test_shift_update_and_delete() {
        let store = MemoryStore::default();
        let shift = ShiftRepository::create(&store, shift_input(1))
            .await
            .unwrap();

        let updated = ShiftRepository::update(&store, shift.id, ShiftPatch::shift_type(ShiftType::Leave))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.shift_type, ShiftType::Leave);

        assert!(ShiftRepository::delete(&store, shift.id).await.unwrap());
        assert!(!ShiftRepository::delete(&store, shift.id).await.unwrap());
        assert!(ShiftRepository::list_by_schedule(&store, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_read_checks_owner() {
        let store = MemoryStore::default();
        let notification = NotificationRepository::create(
            &store,
            NotificationInput {
                user_id: 1,
                notification_type: crate::database::models::NotificationType::ScheduleUpdate,
                message: "hello".to_string(),
                data: serde_json::json!({}),
            },
        )
        .await
        .unwrap();

        assert!(!store.mark_read(notification.id, 2).await.unwrap());
        assert!(store.mark_read(notification.id, 1).await.unwrap());
        assert_eq!(store.mark_all_read(1).await.unwrap(), 0);
    }
}
