use std::sync::Arc;

use backend::{AvatarStore, BackendError, ProfileStore};
use lms_core::Clock;
use lms_core::model::{Profile, UserId, normalize_full_name};
use tracing::warn;
use url::Url;

use crate::error::{AvatarError, ProfileServiceError};

/// Manages the learner's profile row and the avatar object behind it.
#[derive(Clone)]
pub struct ProfileService {
    clock: Clock,
    profiles: Arc<dyn ProfileStore>,
    avatars: Arc<dyn AvatarStore>,
}

impl ProfileService {
    #[must_use]
    pub fn new(clock: Clock, profiles: Arc<dyn ProfileStore>, avatars: Arc<dyn AvatarStore>) -> Self {
        Self {
            clock,
            profiles,
            avatars,
        }
    }

    /// Loads the profile row; `Ok(None)` means none has been written yet.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Backend` if the read fails.
    pub async fn load_profile(&self, user_id: &UserId) -> Result<Option<Profile>, ProfileServiceError> {
        Ok(self.profiles.get_profile(user_id).await?)
    }

    /// Stores the display name, trimming it first; blank input clears it.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Backend` if the write fails.
    pub async fn update_full_name(
        &self,
        user_id: &UserId,
        full_name: Option<String>,
    ) -> Result<(), ProfileServiceError> {
        let normalized = normalize_full_name(full_name);
        self.profiles
            .upsert_full_name(user_id, normalized.as_deref(), self.clock.now())
            .await?;
        Ok(())
    }

    /// Uploads an avatar image and records its public URL on the profile.
    ///
    /// The object key is derived from the user id plus the file extension,
    /// so a new upload replaces the previous one in place.
    ///
    /// # Errors
    ///
    /// Returns [`AvatarError::MissingExtension`] if the file name carries no
    /// extension, or `AvatarError::Backend` if the upload or the profile
    /// write fails.
    pub async fn upload_avatar(
        &self,
        user_id: &UserId,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Url, AvatarError> {
        let Some(extension) = file_extension(file_name) else {
            return Err(AvatarError::MissingExtension);
        };
        let object_key = format!("{user_id}.{extension}");
        let url = self.avatars.upload(&object_key, bytes, content_type).await?;
        self.profiles
            .upsert_avatar_url(user_id, Some(&url), self.clock.now())
            .await?;
        Ok(url)
    }

    /// Deletes the stored avatar object and clears the profile field.
    ///
    /// A profile without an avatar is left untouched. An object that is
    /// already gone does not block clearing the field.
    ///
    /// # Errors
    ///
    /// Returns `AvatarError::Backend` if the removal or the profile write
    /// fails.
    pub async fn remove_avatar(&self, user_id: &UserId) -> Result<(), AvatarError> {
        let Some(profile) = self.profiles.get_profile(user_id).await? else {
            return Ok(());
        };
        let Some(url) = profile.avatar_url() else {
            return Ok(());
        };

        match object_key_from_url(url) {
            Some(object_key) => match self.avatars.remove(&object_key).await {
                Ok(()) | Err(BackendError::NotFound) => {}
                Err(error) => return Err(error.into()),
            },
            None => {
                warn!(user = %user_id, %url, "avatar url carries no object key, clearing the field only");
            }
        }

        self.profiles
            .upsert_avatar_url(user_id, None, self.clock.now())
            .await?;
        Ok(())
    }
}

/// Extension of an uploaded file name, if it has one.
///
/// A lone extension with no stem (`.png`) does not count.
fn file_extension(file_name: &str) -> Option<&str> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension)
}

/// Last path segment of a stored avatar URL, used as the object key.
fn object_key_from_url(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .next_back()
        .map(str::to_owned)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
