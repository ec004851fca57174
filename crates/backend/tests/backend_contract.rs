use backend::memory::InMemoryBackend;
use backend::{AvatarStore, IdentityProvider, ProfileStore, ProgressStore, ProgressUpsert};
use chrono::Duration;
use lms_core::model::{Credentials, ProjectId, SectionId, SectionRecord, UserId};
use lms_core::time::{fixed_clock, fixed_now};
use url::Url;

fn section(id: &str, completed: bool) -> SectionRecord {
    SectionRecord::new(SectionId::new(id).unwrap(), completed)
}

fn upsert(user: &str, project: &str, sections: Vec<SectionRecord>) -> ProgressUpsert {
    ProgressUpsert::new(
        UserId::new(user).unwrap(),
        ProjectId::new(project).unwrap(),
        lms_core::model::CourseId::new("c1").unwrap(),
        sections,
    )
}

#[tokio::test]
async fn progress_row_is_unique_per_user_and_project_pair() {
    let backend = InMemoryBackend::new().with_clock(fixed_clock());
    let user = UserId::new("u1").unwrap();
    let project = ProjectId::new("p1").unwrap();

    assert!(backend
        .fetch_progress(&project, &user)
        .await
        .unwrap()
        .is_none());

    backend
        .upsert_progress(&upsert("u1", "p1", vec![section("a", true), section("b", false)]))
        .await
        .unwrap();
    backend
        .upsert_progress(&upsert("u1", "p1", vec![section("b", true)]))
        .await
        .unwrap();

    // Still one row for the pair, holding only the second submission.
    let record = backend
        .fetch_progress(&project, &user)
        .await
        .unwrap()
        .unwrap();
    let sections = record.sections().unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].id().as_str(), "b");
    assert!(sections[0].completed());
}

#[tokio::test]
async fn completion_flag_survives_section_rewrites() {
    let backend = InMemoryBackend::new();
    let user = UserId::new("u1").unwrap();
    let project = ProjectId::new("p1").unwrap();

    backend
        .upsert_progress(&upsert("u1", "p1", vec![section("a", true)]))
        .await
        .unwrap();
    backend
        .set_project_completed(&user, &project, true)
        .unwrap();
    backend
        .upsert_progress(&upsert("u1", "p1", Vec::new()))
        .await
        .unwrap();

    let record = backend
        .fetch_progress(&project, &user)
        .await
        .unwrap()
        .unwrap();
    assert!(record.is_project_complete());
    assert_eq!(record.sections().unwrap().len(), 0);
}

#[tokio::test]
async fn first_access_time_is_kept_across_rewrites() {
    let mut clock = fixed_clock();
    let backend = InMemoryBackend::new().with_clock(clock);
    let user = UserId::new("u1").unwrap();
    let project = ProjectId::new("p1").unwrap();

    backend
        .upsert_progress(&upsert("u1", "p1", vec![section("a", false)]))
        .await
        .unwrap();

    clock.advance(Duration::hours(2));
    let backend = backend.with_clock(clock);
    backend
        .upsert_progress(&upsert("u1", "p1", vec![section("a", true)]))
        .await
        .unwrap();

    let record = backend
        .fetch_progress(&project, &user)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.last_accessed(), Some(fixed_now()));
    assert_eq!(record.updated_at(), Some(fixed_now() + Duration::hours(2)));
}

#[tokio::test]
async fn profile_upserts_touch_one_column_at_a_time() {
    let backend = InMemoryBackend::new();
    let user = UserId::new("u1").unwrap();
    let avatar = Url::parse("https://avatars.invalid/u1.png").unwrap();

    backend
        .upsert_full_name(&user, Some("Ada Lovelace"), fixed_now())
        .await
        .unwrap();
    backend
        .upsert_avatar_url(&user, Some(&avatar), fixed_now() + Duration::minutes(1))
        .await
        .unwrap();

    let profile = backend.get_profile(&user).await.unwrap().unwrap();
    assert_eq!(profile.full_name(), Some("Ada Lovelace"));
    assert_eq!(profile.avatar_url(), Some(&avatar));

    // Clearing the avatar leaves the name alone.
    backend
        .upsert_avatar_url(&user, None, fixed_now() + Duration::minutes(2))
        .await
        .unwrap();
    let profile = backend.get_profile(&user).await.unwrap().unwrap();
    assert_eq!(profile.full_name(), Some("Ada Lovelace"));
    assert_eq!(profile.avatar_url(), None);
}

#[tokio::test]
async fn identity_session_lifecycle() {
    let backend = InMemoryBackend::new();
    let credentials = Credentials::new("ada@example.com", "hunter2").unwrap();

    assert_eq!(backend.current_user().await.unwrap(), None);

    let registered = backend.sign_up(&credentials).await.unwrap();
    assert_eq!(backend.current_user().await.unwrap(), Some(registered.clone()));

    backend.sign_out().await.unwrap();
    assert_eq!(backend.current_user().await.unwrap(), None);

    let signed_in = backend.sign_in(&credentials).await.unwrap();
    assert_eq!(signed_in, registered);
}

#[tokio::test]
async fn avatar_reupload_overwrites_object_under_same_key() {
    let backend = InMemoryBackend::new();

    let first = backend
        .upload("u1.png", vec![1], "image/png")
        .await
        .unwrap();
    let second = backend
        .upload("u1.png", vec![2, 2], "image/png")
        .await
        .unwrap();

    assert_eq!(first, second);
    let (bytes, _) = backend.object("u1.png").unwrap();
    assert_eq!(bytes, vec![2, 2]);
}
