use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lms_core::Clock;
use lms_core::model::{
    AuthUser, Course, CourseId, Credentials, Profile, ProgressRecord, ProjectId, Role, UserId,
    ValidatedCourse,
};
use url::Url;
use uuid::Uuid;

use crate::contract::{
    AccessControl, AvatarStore, Backend, BackendError, CourseCatalog, IdentityProvider,
    NewCourseRecord, ProfileStore, ProgressStore, ProgressUpsert,
};

#[derive(Clone)]
struct Account {
    user: AuthUser,
    email: String,
    password: String,
}

#[derive(Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// In-memory backend implementation for testing and prototyping.
///
/// Behaves like the hosted platform: progress rows are keyed by
/// (user, project) and replaced wholesale on upsert, sign-up opens a
/// session, and uploads mint stable public URLs.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    clock: Clock,
    progress: Arc<Mutex<HashMap<(UserId, ProjectId), ProgressRecord>>>,
    courses: Arc<Mutex<Vec<Course>>>,
    profiles: Arc<Mutex<HashMap<UserId, Profile>>>,
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    accounts: Arc<Mutex<Vec<Account>>>,
    session: Arc<Mutex<Option<AuthUser>>>,
    roles: Arc<Mutex<HashSet<(UserId, Role)>>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the given clock for backend-issued timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Installs or replaces a course row, projects included.
    ///
    /// The catalog contract only inserts project-less courses, so tests
    /// seed richer rows through this.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the store is unavailable.
    pub fn put_course(&self, course: Course) -> Result<(), BackendError> {
        let mut guard = self
            .courses
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        if let Some(existing) = guard.iter_mut().find(|c| c.id() == course.id()) {
            *existing = course;
        } else {
            guard.push(course);
        }
        Ok(())
    }

    /// Grants a role to a user.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the store is unavailable.
    pub fn grant_role(&self, user_id: &UserId, role: Role) -> Result<(), BackendError> {
        let mut guard = self
            .roles
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        guard.insert((user_id.clone(), role));
        Ok(())
    }

    /// Writes the authoritative course-completion flag on an existing
    /// progress row. This is the platform-side signal; ordinary progress
    /// upserts never touch the flag.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if the learner has no progress row
    /// for the project.
    pub fn set_project_completed(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
        completed: bool,
    ) -> Result<(), BackendError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        let key = (user_id.clone(), project_id.clone());
        let record = guard.get(&key).ok_or(BackendError::NotFound)?;
        let updated = ProgressRecord::from_persisted(
            record.user_id().clone(),
            record.project_id().clone(),
            record.course_id().clone(),
            record.sections().map(<[_]>::to_vec),
            completed,
            record.last_accessed(),
            Some(self.clock.now()),
        );
        guard.insert(key, updated);
        Ok(())
    }

    /// Returns a stored object's bytes and content type, for assertions.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if no such object exists.
    pub fn object(&self, object_key: &str) -> Result<(Vec<u8>, String), BackendError> {
        let guard = self
            .objects
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        guard
            .get(object_key)
            .map(|o| (o.bytes.clone(), o.content_type.clone()))
            .ok_or(BackendError::NotFound)
    }

    fn mint_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

#[async_trait]
impl ProgressStore for InMemoryBackend {
    async fn fetch_progress(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Option<ProgressRecord>, BackendError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        Ok(guard.get(&(user_id.clone(), project_id.clone())).cloned())
    }

    async fn upsert_progress(&self, upsert: &ProgressUpsert) -> Result<(), BackendError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        let key = (upsert.user_id().clone(), upsert.project_id().clone());
        // The flag and first-access time survive section replacement.
        let (project_completed, last_accessed) = match guard.get(&key) {
            Some(existing) => (existing.is_project_complete(), existing.last_accessed()),
            None => (false, Some(self.now())),
        };
        let record = ProgressRecord::from_persisted(
            upsert.user_id().clone(),
            upsert.project_id().clone(),
            upsert.course_id().clone(),
            Some(upsert.completed_sections().to_vec()),
            project_completed,
            last_accessed,
            Some(self.now()),
        );
        guard.insert(key, record);
        Ok(())
    }
}

#[async_trait]
impl CourseCatalog for InMemoryBackend {
    async fn list_courses(&self) -> Result<Vec<Course>, BackendError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, BackendError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        Ok(guard.iter().find(|c| c.id() == id).cloned())
    }

    async fn insert_course(&self, record: NewCourseRecord) -> Result<CourseId, BackendError> {
        let id = CourseId::new(self.mint_id())
            .map_err(|e| BackendError::Serialization(e.to_string()))?;
        let course = Course::from_persisted(
            id.clone(),
            record.name,
            record.description,
            Some(record.owner_id),
            record.is_published,
            Some(self.now()),
            Vec::new(),
        )
        .map_err(|e| BackendError::Serialization(e.to_string()))?;
        let mut guard = self
            .courses
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        guard.push(course);
        Ok(id)
    }

    async fn update_course(
        &self,
        id: &CourseId,
        fields: ValidatedCourse,
    ) -> Result<(), BackendError> {
        let mut guard = self
            .courses
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        let course = guard
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or(BackendError::NotFound)?;
        *course = course.clone().with_fields(fields);
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for InMemoryBackend {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, BackendError> {
        let guard = self
            .profiles
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        Ok(guard.get(user_id).cloned())
    }

    async fn upsert_full_name(
        &self,
        user_id: &UserId,
        full_name: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), BackendError> {
        let mut guard = self
            .profiles
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        let avatar_url = guard.get(user_id).and_then(|p| p.avatar_url().cloned());
        let profile = Profile::from_persisted(
            user_id.clone(),
            full_name.map(str::to_owned),
            avatar_url,
            Some(updated_at),
        );
        guard.insert(user_id.clone(), profile);
        Ok(())
    }

    async fn upsert_avatar_url(
        &self,
        user_id: &UserId,
        avatar_url: Option<&Url>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), BackendError> {
        let mut guard = self
            .profiles
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        let full_name = guard
            .get(user_id)
            .and_then(|p| p.full_name().map(str::to_owned));
        let profile = Profile::from_persisted(
            user_id.clone(),
            full_name,
            avatar_url.cloned(),
            Some(updated_at),
        );
        guard.insert(user_id.clone(), profile);
        Ok(())
    }
}

#[async_trait]
impl AvatarStore for InMemoryBackend {
    async fn upload(
        &self,
        object_key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Url, BackendError> {
        let mut guard = self
            .objects
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        guard.insert(
            object_key.to_owned(),
            StoredObject {
                bytes,
                content_type: content_type.to_owned(),
            },
        );
        Url::parse(&format!("https://avatars.invalid/{object_key}"))
            .map_err(|e| BackendError::Serialization(e.to_string()))
    }

    async fn remove(&self, object_key: &str) -> Result<(), BackendError> {
        let mut guard = self
            .objects
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        guard
            .remove(object_key)
            .map(|_| ())
            .ok_or(BackendError::NotFound)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryBackend {
    async fn current_user(&self) -> Result<Option<AuthUser>, BackendError> {
        let guard = self
            .session
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthUser, BackendError> {
        let accounts = self
            .accounts
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        let account = accounts
            .iter()
            .find(|a| {
                a.email.eq_ignore_ascii_case(credentials.email())
                    && a.password == credentials.password()
            })
            .cloned()
            .ok_or_else(|| BackendError::Rejected {
                status: 400,
                message: "invalid login credentials".to_owned(),
            })?;
        drop(accounts);

        let mut session = self
            .session
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        *session = Some(account.user.clone());
        Ok(account.user)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthUser, BackendError> {
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        if accounts
            .iter()
            .any(|a| a.email.eq_ignore_ascii_case(credentials.email()))
        {
            return Err(BackendError::Rejected {
                status: 422,
                message: "user already registered".to_owned(),
            });
        }

        let id = UserId::new(self.mint_id())
            .map_err(|e| BackendError::Serialization(e.to_string()))?;
        let user = AuthUser::new(id, Some(credentials.email().to_owned()));
        accounts.push(Account {
            user: user.clone(),
            email: credentials.email().to_owned(),
            password: credentials.password().to_owned(),
        });
        drop(accounts);

        // Registration opens a session right away, like the hosted platform
        // does when email confirmation is disabled.
        let mut session = self
            .session
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        *session = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let mut session = self
            .session
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        *session = None;
        Ok(())
    }
}

#[async_trait]
impl AccessControl for InMemoryBackend {
    async fn has_role(&self, user_id: &UserId, role: Role) -> Result<bool, BackendError> {
        let guard = self
            .roles
            .lock()
            .map_err(|e| BackendError::Connection(e.to_string()))?;
        Ok(guard.contains(&(user_id.clone(), role)))
    }
}

impl Backend {
    /// Build a `Backend` that keeps everything in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_in_memory(InMemoryBackend::new())
    }

    /// Build a `Backend` over an existing in-memory instance, keeping a
    /// handle to it for seeding.
    #[must_use]
    pub fn from_in_memory(backend: InMemoryBackend) -> Self {
        let progress: Arc<dyn ProgressStore> = Arc::new(backend.clone());
        let catalog: Arc<dyn CourseCatalog> = Arc::new(backend.clone());
        let profiles: Arc<dyn ProfileStore> = Arc::new(backend.clone());
        let avatars: Arc<dyn AvatarStore> = Arc::new(backend.clone());
        let identity: Arc<dyn IdentityProvider> = Arc::new(backend.clone());
        let access: Arc<dyn AccessControl> = Arc::new(backend);
        Self {
            progress,
            catalog,
            profiles,
            avatars,
            identity,
            access,
        }
    }
}
