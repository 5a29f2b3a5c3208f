use std::fmt;

/// A named image repository in the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
}

impl Repository {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Identifies a single image within a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageIdentifier {
    /// Content digest of the image manifest (e.g., "sha256:...")
    pub digest: String,
    /// Tag, if the listing returned one. Always `None` for untagged listings.
    pub tag: Option<String>,
}

/// Result of a delete request the registry accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The request succeeded but the registry refused to delete this image
    /// (e.g., "ImageReferencedByManifestList" or "ImageNotFound")
    Rejected { code: String, reason: String },
}

/// Tag status filter for image listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagStatus {
    #[default]
    Untagged,
    Tagged,
    Any,
}

impl TagStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagStatus::Untagged => "UNTAGGED",
            TagStatus::Tagged => "TAGGED",
            TagStatus::Any => "ANY",
        }
    }

    /// Whether an image with the given tag passes this filter
    pub fn matches(&self, tag: Option<&str>) -> bool {
        match self {
            TagStatus::Untagged => tag.is_none(),
            TagStatus::Tagged => tag.is_some(),
            TagStatus::Any => true,
        }
    }
}

impl fmt::Display for TagStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_status_wire_names() {
        assert_eq!(TagStatus::default().to_string(), "UNTAGGED");
        assert_eq!(TagStatus::Tagged.as_str(), "TAGGED");
        assert_eq!(TagStatus::Any.as_str(), "ANY");
    }

    #[test]
    fn test_tag_status_matches() {
        assert!(TagStatus::Untagged.matches(None));
        assert!(!TagStatus::Untagged.matches(Some("latest")));
        assert!(TagStatus::Tagged.matches(Some("v1")));
        assert!(TagStatus::Any.matches(Some("v1")));
        assert!(TagStatus::Any.matches(None));
    }
}
