use chrono::{DateTime, Utc};
use url::Url;

use crate::model::ids::UserId;

/// A learner's profile row.
///
/// Every field apart from the id is optional; the row may not exist at all
/// for freshly registered accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    id: UserId,
    full_name: Option<String>,
    avatar_url: Option<Url>,
    updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Rebuilds a profile from persisted parts, normalizing blank names
    /// away.
    #[must_use]
    pub fn from_persisted(
        id: UserId,
        full_name: Option<String>,
        avatar_url: Option<Url>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            full_name: normalize_full_name(full_name),
            avatar_url,
            updated_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    #[must_use]
    pub fn avatar_url(&self) -> Option<&Url> {
        self.avatar_url.as_ref()
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// Trims a display name; blank input clears it to `None`.
#[must_use]
pub fn normalize_full_name(raw: Option<String>) -> Option<String> {
    raw.map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_keeps_name() {
        assert_eq!(
            normalize_full_name(Some("  Ada Lovelace  ".into())),
            Some("Ada Lovelace".into())
        );
    }

    #[test]
    fn normalize_clears_blank_name() {
        assert_eq!(normalize_full_name(Some("   ".into())), None);
        assert_eq!(normalize_full_name(None), None);
    }

    #[test]
    fn profile_from_persisted_normalizes_name() {
        let profile = Profile::from_persisted(
            UserId::new("u1").unwrap(),
            Some("  ".into()),
            None,
            None,
        );
        assert_eq!(profile.full_name(), None);
    }
}
