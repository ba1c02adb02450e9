use super::{records_or_seed, unique_id};
use crate::domain::notice::Notice;
use crate::domain::ports::{TEACHERS_KEY, TeacherStoreBox};
use crate::domain::seed;
use crate::domain::teacher::{NewTeacher, Teacher, TeacherPatch};
use crate::error::{Result, StaffPayError};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::info;

/// Latency of the add-teacher submit path.
pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(1500);

/// The teacher list and its durable copy.
///
/// Every mutation computes the new list, persists it in full and only then
/// replaces the in-memory list, so a failed write leaves both untouched.
pub struct TeacherRoster {
    store: TeacherStoreBox,
    teachers: Vec<Teacher>,
    submit_delay: Duration,
    notice: Option<Notice>,
}

impl TeacherRoster {
    /// Loads the roster. Never fails: unreadable data falls back to the seed
    /// teachers and leaves a notice behind.
    pub async fn load(store: TeacherStoreBox) -> Self {
        let loaded = store.load_teachers().await;
        let (teachers, notice) = records_or_seed(TEACHERS_KEY, loaded, seed::teachers);
        Self {
            store,
            teachers,
            submit_delay: DEFAULT_SUBMIT_DELAY,
            notice,
        }
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    /// The notice produced while loading, if the stored data was unusable.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn get(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.id == id)
    }

    pub fn search(&self, term: &str) -> Vec<&Teacher> {
        self.teachers.iter().filter(|t| t.matches(term)).collect()
    }

    pub fn active(&self) -> Vec<&Teacher> {
        self.teachers.iter().filter(|t| t.is_active()).collect()
    }

    /// Validates the form, waits out the submit delay and appends the teacher.
    pub async fn add(&mut self, form: NewTeacher) -> Result<Teacher> {
        form.validate()?;
        tokio::time::sleep(self.submit_delay).await;
        self.add_at(form, Utc::now()).await
    }

    pub async fn add_at(&mut self, form: NewTeacher, now: DateTime<Utc>) -> Result<Teacher> {
        let id = unique_id(now, |id| self.get(id).is_some());
        let teacher = form.into_teacher(id, now)?;

        let mut teachers = self.teachers.clone();
        teachers.push(teacher.clone());
        self.commit(teachers).await?;

        info!(id = %teacher.id, name = %teacher.name, "teacher added");
        Ok(teacher)
    }

    /// Merges `patch` over the teacher with `id`. The patched fields must pass
    /// the same rules as the add-teacher form.
    pub async fn update(&mut self, id: &str, patch: TeacherPatch) -> Result<Teacher> {
        patch.validate()?;
        let mut teachers = self.teachers.clone();
        let teacher = teachers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        teacher.apply(patch);
        let updated = teacher.clone();
        self.commit(teachers).await?;

        info!(id, "teacher updated");
        Ok(updated)
    }

    pub async fn delete(&mut self, id: &str) -> Result<Teacher> {
        let position = self
            .teachers
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        let mut teachers = self.teachers.clone();
        let removed = teachers.remove(position);
        self.commit(teachers).await?;

        info!(id, name = %removed.name, "teacher deleted");
        Ok(removed)
    }

    async fn commit(&mut self, teachers: Vec<Teacher>) -> Result<()> {
        self.store.save_teachers(&teachers).await?;
        self.teachers = teachers;
        Ok(())
    }
}

fn not_found(id: &str) -> StaffPayError {
    StaffPayError::NotFound(format!("Teacher '{id}' not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::TeacherStore;
    use crate::domain::teacher::{Qualification, TeacherStatus};
    use crate::infrastructure::in_memory::InMemoryStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    fn form(name: &str) -> NewTeacher {
        NewTeacher {
            name: name.to_string(),
            email: "grace@school.edu".to_string(),
            subject: "Computer Science".to_string(),
            experience: 3,
            salary: dec!(4000),
            status: TeacherStatus::Active,
            phone: String::new(),
            rating: None,
            role: "Teacher".to_string(),
            birthdate: "1990-01-01".to_string(),
            address: "1 Harbour Road, Springfield".to_string(),
            qualifications: vec![Qualification {
                name: "BSc Computing".to_string(),
                rate: 4,
            }],
        }
    }

    async fn roster(store: &InMemoryStore) -> TeacherRoster {
        TeacherRoster::load(Box::new(store.clone()))
            .await
            .with_submit_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_load_starts_from_seed() {
        let store = InMemoryStore::new();
        let roster = roster(&store).await;
        assert_eq!(roster.teachers().len(), 3);
        assert_eq!(roster.active().len(), 2);
        assert!(roster.notice().is_none());
    }

    #[tokio::test]
    async fn test_load_falls_back_on_malformed_data() {
        let store = InMemoryStore::new();
        store.put_raw(TEACHERS_KEY, "not json").await;
        let roster = roster(&store).await;
        assert_eq!(roster.teachers(), seed::teachers().as_slice());
        assert!(roster.notice().unwrap().is_error());
    }

    #[tokio::test]
    async fn test_add_persists_and_reloads() {
        let store = InMemoryStore::new();
        let mut roster = roster(&store).await;
        let added = roster.add(form("Grace Hopper")).await.unwrap();
        assert_eq!(added.rating, 4.0);
        assert_eq!(added.salary, dec!(4000));

        let reloaded = TeacherRoster::load(Box::new(store.clone())).await;
        assert_eq!(reloaded.teachers().len(), 4);
        assert_eq!(reloaded.get(&added.id).unwrap().name, "Grace Hopper");
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_form() {
        let store = InMemoryStore::new();
        let mut roster = roster(&store).await;
        let mut bad = form("Grace Hopper");
        bad.salary = dec!(999);
        assert!(matches!(
            roster.add(bad).await,
            Err(StaffPayError::ValidationError(_))
        ));
        assert_eq!(roster.teachers().len(), 3);
        assert!(store.load_teachers().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_ids_stay_unique() {
        let store = InMemoryStore::new();
        let mut roster = roster(&store).await;
        let now = Utc::now();
        let first = roster.add_at(form("Grace Hopper"), now).await.unwrap();
        let second = roster.add_at(form("Alan Turing"), now).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let store = InMemoryStore::new();
        let mut roster = roster(&store).await;
        let patch = TeacherPatch {
            salary: Some(dec!(4800)),
            status: Some(TeacherStatus::Active),
            ..Default::default()
        };
        let updated = roster.update("3", patch).await.unwrap();
        assert_eq!(updated.salary, dec!(4800));
        assert!(updated.is_active());
        assert_eq!(updated.name, "Mike Brown");

        let stored = store.load_teachers().await.unwrap().unwrap();
        assert_eq!(stored[2].salary, dec!(4800));
    }

    #[tokio::test]
    async fn test_update_rejects_patch_breaking_form_rules() {
        let store = InMemoryStore::new();
        let mut roster = roster(&store).await;
        let patch = TeacherPatch {
            salary: Some(dec!(-5)),
            rating: Some(9.0),
            email: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            roster.update("1", patch).await,
            Err(StaffPayError::ValidationError(_))
        ));

        let john = roster.get("1").unwrap();
        assert_eq!(john.salary, dec!(4500));
        assert_eq!(john.rating, 4.8);
        assert_eq!(john.email, "john.smith@school.edu");
        assert!(store.load_teachers().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_from_search_and_store() {
        let store = InMemoryStore::new();
        let mut roster = roster(&store).await;
        assert_eq!(roster.search("sarah").len(), 1);

        roster.delete("2").await.unwrap();
        assert!(roster.search("sarah").is_empty());
        assert!(roster.search("english").is_empty());

        let reloaded = TeacherRoster::load(Box::new(store.clone())).await;
        assert!(reloaded.get("2").is_none());
        assert_eq!(reloaded.teachers().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = InMemoryStore::new();
        let mut roster = roster(&store).await;
        assert!(matches!(
            roster.delete("42").await,
            Err(StaffPayError::NotFound(_))
        ));
        assert!(matches!(
            roster.update("42", TeacherPatch::default()).await,
            Err(StaffPayError::NotFound(_))
        ));
    }

    struct ReadOnlyStore;

    #[async_trait]
    impl TeacherStore for ReadOnlyStore {
        async fn load_teachers(&self) -> Result<Option<Vec<Teacher>>> {
            Ok(None)
        }

        async fn save_teachers(&self, _: &[Teacher]) -> Result<()> {
            Err(StaffPayError::StorageError("read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_write_leaves_memory_unchanged() {
        let mut roster = TeacherRoster::load(Box::new(ReadOnlyStore)).await;
        assert!(roster.delete("1").await.is_err());
        assert!(roster.get("1").is_some());
    }
}
