use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Error type for identifiers built from an empty or blank string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyIdError {
    kind: &'static str,
}

impl fmt::Display for EmptyIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} requires a non-empty string", self.kind)
    }
}

impl std::error::Error for EmptyIdError {}

fn non_empty(raw: String, kind: &'static str) -> Result<String, EmptyIdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EmptyIdError { kind });
    }
    if trimmed.len() == raw.len() {
        Ok(raw)
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Unique identifier for a learner account, issued by the identity platform.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a new `UserId`
    ///
    /// # Errors
    ///
    /// Returns `EmptyIdError` if the string is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyIdError> {
        non_empty(id.into(), "UserId").map(Self)
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a Course
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CourseId(String);

impl CourseId {
    /// Creates a new `CourseId`
    ///
    /// # Errors
    ///
    /// Returns `EmptyIdError` if the string is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyIdError> {
        non_empty(id.into(), "CourseId").map(Self)
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a Project within a course
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProjectId(String);

impl ProjectId {
    /// Creates a new `ProjectId`
    ///
    /// # Errors
    ///
    /// Returns `EmptyIdError` if the string is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyIdError> {
        non_empty(id.into(), "ProjectId").map(Self)
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a Section within a project
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SectionId(String);

impl SectionId {
    /// Creates a new `SectionId`
    ///
    /// # Errors
    ///
    /// Returns `EmptyIdError` if the string is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyIdError> {
        non_empty(id.into(), "SectionId").map(Self)
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({:?})", self.0)
    }
}

impl fmt::Debug for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CourseId({:?})", self.0)
    }
}

impl fmt::Debug for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProjectId({:?})", self.0)
    }
}

impl fmt::Debug for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SectionId({:?})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

impl FromStr for UserId {
    type Err = EmptyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl FromStr for CourseId {
    type Err = EmptyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl FromStr for ProjectId {
    type Err = EmptyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl FromStr for SectionId {
    type Err = EmptyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_display() {
        let id = UserId::new("user-42").unwrap();
        assert_eq!(id.to_string(), "user-42");
    }

    #[test]
    fn test_user_id_rejects_empty() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("   ").is_err());
    }

    #[test]
    fn test_user_id_trims_padding() {
        let id = UserId::new("  user-42  ").unwrap();
        assert_eq!(id.as_str(), "user-42");
    }

    #[test]
    fn test_course_id_from_str() {
        let id: CourseId = "course-7".parse().unwrap();
        assert_eq!(id, CourseId::new("course-7").unwrap());
    }

    #[test]
    fn test_course_id_from_str_blank() {
        let result = "  ".parse::<CourseId>();
        assert!(result.is_err());
    }

    #[test]
    fn test_project_id_display() {
        let id = ProjectId::new("p-1").unwrap();
        assert_eq!(id.to_string(), "p-1");
    }

    #[test]
    fn test_section_id_from_str() {
        let id: SectionId = "intro".parse().unwrap();
        assert_eq!(id.as_str(), "intro");
    }

    #[test]
    fn test_error_names_the_kind() {
        let error = SectionId::new("").unwrap_err();
        assert_eq!(error.to_string(), "SectionId requires a non-empty string");
    }

    #[test]
    fn test_id_roundtrip() {
        let original = ProjectId::new("project-9").unwrap();
        let serialized = original.to_string();
        let deserialized: ProjectId = serialized.parse().unwrap();
        assert_eq!(original, deserialized);
    }
}
