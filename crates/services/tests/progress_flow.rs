use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use backend::memory::InMemoryBackend;
use backend::{BackendError, ProgressStore, ProgressUpsert};
use lms_core::model::{CourseId, ProgressRecord, ProjectId, SectionId, SectionRecord, UserId};
use services::ProgressService;

fn user() -> UserId {
    UserId::new("learner-1").unwrap()
}

fn project() -> ProjectId {
    ProjectId::new("project-1").unwrap()
}

fn course() -> CourseId {
    CourseId::new("course-1").unwrap()
}

fn section(id: &str, completed: bool) -> SectionRecord {
    SectionRecord::new(SectionId::new(id).unwrap(), completed)
}

/// Wraps the in-memory store and refuses writes on demand.
#[derive(Clone)]
struct FlakyStore {
    inner: InMemoryBackend,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    fn new(inner: InMemoryBackend) -> Self {
        Self {
            inner,
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProgressStore for FlakyStore {
    async fn fetch_progress(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Option<ProgressRecord>, BackendError> {
        self.inner.fetch_progress(project_id, user_id).await
    }

    async fn upsert_progress(&self, upsert: &ProgressUpsert) -> Result<(), BackendError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BackendError::Connection("simulated connection loss".into()));
        }
        self.inner.upsert_progress(upsert).await
    }
}

#[tokio::test]
async fn first_visit_toggle_and_submit() {
    let service = ProgressService::new(Arc::new(InMemoryBackend::new()));

    // Opening a project before any work shows a clean slate.
    let before = service
        .fetch_progress(&user(), &project())
        .await
        .expect("first fetch");
    assert!(before.is_none());
    let overview = service
        .overview(&user(), &project(), 4)
        .await
        .expect("empty overview");
    assert!(!overview.started);
    assert_eq!(overview.percent, 0);

    // The learner works through half the sections and saves.
    service
        .submit_progress(
            &user(),
            &project(),
            &course(),
            vec![
                section("intro", true),
                section("setup", true),
                section("build", false),
                section("ship", false),
            ],
        )
        .await
        .expect("submit");

    let overview = service
        .overview(&user(), &project(), 4)
        .await
        .expect("overview after submit");
    assert!(overview.started);
    assert_eq!(overview.completed_sections, 2);
    assert_eq!(overview.percent, 50);
    assert!(!overview.project_completed);
}

#[tokio::test]
async fn percentages_round_and_clamp() {
    let service = ProgressService::new(Arc::new(InMemoryBackend::new()));

    service
        .submit_progress(
            &user(),
            &project(),
            &course(),
            vec![section("a", true), section("b", false), section("c", false)],
        )
        .await
        .expect("submit one of three");
    let overview = service
        .overview(&user(), &project(), 3)
        .await
        .expect("overview");
    assert_eq!(overview.percent, 33);

    // More completed sections than the declared plan still reads 100.
    service
        .submit_progress(
            &user(),
            &project(),
            &course(),
            vec![
                section("a", true),
                section("b", true),
                section("c", true),
                section("extra", true),
            ],
        )
        .await
        .expect("submit beyond plan");
    let overview = service
        .overview(&user(), &project(), 3)
        .await
        .expect("overview beyond plan");
    assert_eq!(overview.percent, 100);

    // A project with no published section plan displays zero.
    let overview = service
        .overview(&user(), &project(), 0)
        .await
        .expect("overview without plan");
    assert_eq!(overview.percent, 0);
}

#[tokio::test]
async fn failed_submit_leaves_cache_and_backend_untouched() {
    let backend = InMemoryBackend::new();
    let store = FlakyStore::new(backend.clone());
    let service = ProgressService::new(Arc::new(store.clone()));

    service
        .submit_progress(&user(), &project(), &course(), vec![section("a", true)])
        .await
        .expect("seed submit");
    let saved = service
        .fetch_progress(&user(), &project())
        .await
        .expect("fetch saved")
        .expect("saved record");
    assert_eq!(saved.completed_count(), 1);

    store.fail_writes(true);
    let err = service
        .submit_progress(
            &user(),
            &project(),
            &course(),
            vec![section("a", true), section("b", true)],
        )
        .await
        .expect_err("submit during outage");
    match err {
        services::ProgressError::Backend(BackendError::Connection(message)) => {
            assert_eq!(message, "simulated connection loss");
        }
        other => panic!("expected connection error, got {other:?}"),
    }

    // The cached state still serves, and the stored row never changed.
    let cached = service
        .fetch_progress(&user(), &project())
        .await
        .expect("fetch after failure")
        .expect("cached record");
    assert_eq!(cached.completed_count(), 1);

    let stored = backend
        .fetch_progress(&project(), &user())
        .await
        .expect("direct fetch")
        .expect("stored record");
    assert_eq!(stored.completed_count(), 1);
    assert!(stored.sections().unwrap().iter().all(|s| s.id().as_str() != "b"));

    // Once the connection returns, the same submission goes through.
    store.fail_writes(false);
    service
        .submit_progress(
            &user(),
            &project(),
            &course(),
            vec![section("a", true), section("b", true)],
        )
        .await
        .expect("retry after outage");
    let overview = service
        .overview(&user(), &project(), 2)
        .await
        .expect("overview after retry");
    assert_eq!(overview.percent, 100);
}

#[tokio::test]
async fn second_submit_replaces_the_first() {
    let backend = InMemoryBackend::new();
    let service = ProgressService::new(Arc::new(backend.clone()));

    service
        .submit_progress(
            &user(),
            &project(),
            &course(),
            vec![section("a", true), section("b", true)],
        )
        .await
        .expect("first submit");
    service
        .submit_progress(
            &user(),
            &project(),
            &course(),
            vec![section("a", false), section("c", true)],
        )
        .await
        .expect("second submit");

    let record = service
        .fetch_progress(&user(), &project())
        .await
        .expect("fetch")
        .expect("record");
    let sections = record.sections().expect("sections");
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].id().as_str(), "a");
    assert!(!sections[0].completed());
    assert_eq!(sections[1].id().as_str(), "c");
    assert!(sections[1].completed());
    // The replaced section is gone rather than merged.
    assert!(sections.iter().all(|s| s.id().as_str() != "b"));
}

#[tokio::test]
async fn fresh_session_observes_submitted_state() {
    let backend = InMemoryBackend::new();
    let first_session = ProgressService::new(Arc::new(backend.clone()));
    let second_session = ProgressService::new(Arc::new(backend));

    first_session
        .fetch_progress(&user(), &project())
        .await
        .expect("warm cache");
    first_session
        .submit_progress(&user(), &project(), &course(), vec![section("a", true)])
        .await
        .expect("submit");

    let record = second_session
        .fetch_progress(&user(), &project())
        .await
        .expect("fetch in new session")
        .expect("record");
    assert_eq!(record.completed_count(), 1);
}

#[tokio::test]
async fn completion_flag_survives_further_submissions() {
    let backend = InMemoryBackend::new();
    let service = ProgressService::new(Arc::new(backend.clone()));

    service
        .submit_progress(&user(), &project(), &course(), vec![section("a", true)])
        .await
        .expect("initial submit");
    backend
        .set_project_completed(&user(), &project(), true)
        .expect("platform marks complete");

    service
        .submit_progress(
            &user(),
            &project(),
            &course(),
            vec![section("a", true), section("b", false)],
        )
        .await
        .expect("later submit");

    let overview = service
        .overview(&user(), &project(), 2)
        .await
        .expect("overview");
    assert!(overview.project_completed);
}
