//! Wire rows for the platform's REST and auth payloads, and their mapping
//! into domain types.

use chrono::{DateTime, Utc};
use lms_core::model::{
    AuthUser, Course, CourseId, Profile, ProgressRecord, Project, ProjectId, SectionRecord, UserId,
    normalize_sections,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::contract::{BackendError, NewCourseRecord, ProgressUpsert};

fn ser<E: core::fmt::Display>(e: E) -> BackendError {
    BackendError::Serialization(e.to_string())
}

/// Pulls a human-readable message out of a platform error body.
///
/// REST errors carry `message`, auth errors `msg` or `error_description`.
/// Falls back to the raw body, then to the status reason.
pub(crate) fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(message) = value.get(key).and_then(Value::as_str) {
                if !message.trim().is_empty() {
                    return message.to_owned();
                }
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request rejected")
            .to_owned()
    } else {
        trimmed.to_owned()
    }
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressRow {
    pub user_id: String,
    pub project_id: String,
    pub course_id: String,
    #[serde(default)]
    pub completed_sections: Option<Value>,
    #[serde(default)]
    pub project_completed: Option<bool>,
    #[serde(default)]
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgressRow {
    pub(crate) fn into_record(self) -> Result<ProgressRecord, BackendError> {
        let user_id = UserId::new(self.user_id).map_err(ser)?;
        let project_id = ProjectId::new(self.project_id).map_err(ser)?;
        let course_id = CourseId::new(self.course_id).map_err(ser)?;

        // Null means the learner never submitted; anything else is coerced,
        // with unusable entries dropped rather than failing the read.
        let sections = match self.completed_sections {
            None | Some(Value::Null) => None,
            Some(raw) => {
                let declared = raw.as_array().map_or(0, Vec::len);
                let sections = normalize_sections(Some(&raw));
                if sections.len() < declared {
                    warn!(
                        user = %user_id,
                        project = %project_id,
                        dropped = declared - sections.len(),
                        "dropped malformed section entries"
                    );
                }
                Some(sections)
            }
        };

        Ok(ProgressRecord::from_persisted(
            user_id,
            project_id,
            course_id,
            sections,
            self.project_completed.unwrap_or(false),
            self.last_accessed,
            self.updated_at,
        ))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProgressUpsertRow {
    user_id: String,
    project_id: String,
    course_id: String,
    completed_sections: Vec<SectionRecord>,
}

impl ProgressUpsertRow {
    pub(crate) fn from_upsert(upsert: &ProgressUpsert) -> Self {
        Self {
            user_id: upsert.user_id().as_str().to_owned(),
            project_id: upsert.project_id().as_str().to_owned(),
            course_id: upsert.course_id().as_str().to_owned(),
            completed_sections: upsert.completed_sections().to_vec(),
        }
    }
}

//
// ─── COURSES ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub total_sections: Option<u32>,
}

impl ProjectRow {
    fn into_project(self) -> Result<Project, BackendError> {
        let id = ProjectId::new(self.id).map_err(ser)?;
        // A project with no published section plan counts as zero sections.
        Project::new(id, self.name, self.total_sections.unwrap_or(0)).map_err(ser)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CourseRow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub projects: Vec<ProjectRow>,
}

impl CourseRow {
    pub(crate) fn into_course(self) -> Result<Course, BackendError> {
        let id = CourseId::new(self.id).map_err(ser)?;
        let owner_id = self
            .owner_id
            .map(UserId::new)
            .transpose()
            .map_err(ser)?;
        let projects = self
            .projects
            .into_iter()
            .map(ProjectRow::into_project)
            .collect::<Result<Vec<_>, _>>()?;

        Course::from_persisted(
            id,
            self.name,
            self.description,
            owner_id,
            self.is_published.unwrap_or(false),
            self.created_at,
            projects,
        )
        .map_err(ser)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewCourseRow {
    name: String,
    description: Option<String>,
    owner_id: String,
    is_published: bool,
}

impl NewCourseRow {
    pub(crate) fn from_record(record: NewCourseRecord) -> Self {
        Self {
            name: record.name,
            description: record.description,
            owner_id: record.owner_id.as_str().to_owned(),
            is_published: record.is_published,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseFieldsRow {
    pub name: String,
    pub description: Option<String>,
}

//
// ─── PROFILES ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileRow {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileRow {
    pub(crate) fn into_profile(self) -> Result<Profile, BackendError> {
        let id = UserId::new(self.id).map_err(ser)?;
        // A stored avatar URL that no longer parses degrades to no avatar.
        let avatar_url = self.avatar_url.as_deref().and_then(|raw| {
            let parsed = Url::parse(raw).ok();
            if parsed.is_none() {
                warn!(user = %id, "ignoring unparseable avatar URL");
            }
            parsed
        });
        Ok(Profile::from_persisted(
            id,
            self.full_name,
            avatar_url,
            self.updated_at,
        ))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileNameRow {
    pub id: String,
    pub full_name: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileAvatarRow {
    pub id: String,
    pub avatar_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

//
// ─── IDENTITY ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub(crate) struct CredentialsBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthUserRow {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthUserRow {
    pub(crate) fn into_user(self) -> Result<AuthUser, BackendError> {
        let id = UserId::new(self.id).map_err(ser)?;
        Ok(AuthUser::new(id, self.email))
    }
}

/// Session payload returned by token grants and sign-up.
///
/// When email confirmation is enabled, sign-up returns the bare user
/// fields at the top level and no token.
#[derive(Debug, Deserialize)]
pub(crate) struct SessionRow {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUserRow>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SessionRow {
    pub(crate) fn into_parts(self) -> Result<(Option<String>, AuthUser), BackendError> {
        let user = match self.user {
            Some(row) => row.into_user()?,
            None => AuthUserRow {
                id: self.id.ok_or_else(|| {
                    BackendError::Serialization("session payload without a user".into())
                })?,
                email: self.email,
            }
            .into_user()?,
        };
        Ok((self.access_token, user))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
