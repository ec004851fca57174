use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use backend::{ProgressStore, ProgressUpsert};
use lms_core::model::{CourseId, ProgressRecord, ProjectId, SectionRecord, UserId};
use tracing::debug;

use crate::error::ProgressError;

//
// ─── OVERVIEW ──────────────────────────────────────────────────────────────────
//

/// Display-ready aggregation of one learner's progress on one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressOverview {
    pub total_sections: u32,
    pub completed_sections: usize,
    pub percent: u8,
    pub project_completed: bool,
    pub started: bool,
}

//
// ─── CACHE ─────────────────────────────────────────────────────────────────────
//

type CacheKey = (UserId, ProjectId);

/// Session-local cache of fetched progress rows.
///
/// An entry is replaced by a fresh read or dropped by invalidation after a
/// successful write; nothing else touches it. A cached `None` is
/// meaningful: it remembers that the learner has not started the project.
#[derive(Clone, Default)]
struct ProgressCache {
    entries: Arc<Mutex<HashMap<CacheKey, Option<ProgressRecord>>>>,
}

impl ProgressCache {
    fn get(&self, key: &CacheKey) -> Option<Option<ProgressRecord>> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn put(&self, key: CacheKey, record: Option<ProgressRecord>) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, record);
    }

    fn invalidate(&self, key: &CacheKey) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Tracks per-section completion: reads through a session-local cache and
/// persists full-replacement updates.
#[derive(Clone)]
pub struct ProgressService {
    store: Arc<dyn ProgressStore>,
    cache: ProgressCache,
}

impl ProgressService {
    #[must_use]
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self {
            store,
            cache: ProgressCache::default(),
        }
    }

    /// Fetch the progress record for a (user, project) pair.
    ///
    /// Returns `Ok(None)` when the learner has not started the project;
    /// that is an ordinary state, not an error. Repeated calls are served
    /// from the cache until a submission invalidates the entry.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Backend` if the read fails.
    pub async fn fetch_progress(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
    ) -> Result<Option<ProgressRecord>, ProgressError> {
        let key = (user_id.clone(), project_id.clone());
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let record = self.store.fetch_progress(project_id, user_id).await?;
        self.cache.put(key, record.clone());
        Ok(record)
    }

    /// Replace the learner's stored section state for the project.
    ///
    /// The submission carries the complete desired section set; the last
    /// writer wins. On success the cached entry for the pair is dropped so
    /// the next read observes the stored state. On failure the error is
    /// returned as-is, no retry is attempted, and the cache keeps serving
    /// the last fetched state.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Backend` if persistence fails.
    pub async fn submit_progress(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
        course_id: &CourseId,
        sections: Vec<SectionRecord>,
    ) -> Result<(), ProgressError> {
        let upsert = ProgressUpsert::new(
            user_id.clone(),
            project_id.clone(),
            course_id.clone(),
            sections,
        );
        self.store.upsert_progress(&upsert).await?;

        let key = (user_id.clone(), project_id.clone());
        self.cache.invalidate(&key);
        debug!(user = %user_id, project = %project_id, "progress stored, cache entry dropped");
        Ok(())
    }

    /// Aggregate the learner's progress on a project for display.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Backend` if the read fails.
    pub async fn overview(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
        total_sections: u32,
    ) -> Result<ProgressOverview, ProgressError> {
        let record = self.fetch_progress(user_id, project_id).await?;
        Ok(match record {
            Some(record) => ProgressOverview {
                total_sections,
                completed_sections: record.completed_count(),
                percent: record.percent_complete(total_sections),
                project_completed: record.is_project_complete(),
                started: record.started(),
            },
            None => ProgressOverview {
                total_sections,
                completed_sections: 0,
                percent: 0,
                project_completed: false,
                started: false,
            },
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
