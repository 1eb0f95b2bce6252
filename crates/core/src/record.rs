//! The contract shared by every stored resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::DomainResult;
use crate::id::Uuid;

/// A tenant-scoped record persisted by a record store.
///
/// Records are plain data: stores persist them as JSON documents keyed by
/// `(tenant, RESOURCE, record_id)`, so the serde representation is also the
/// storage format.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Resource name used for routing, storage and change notifications.
    const RESOURCE: &'static str;

    fn record_id(&self) -> Uuid;

    /// Project this record belongs to, when it has a project reference.
    fn project_ref(&self) -> Option<Uuid> {
        None
    }

    /// Text fields searched by `?q=` list filters.
    fn search_fields(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Case-insensitive substring match over `search_fields`.
    ///
    /// An empty needle matches everything.
    fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// A record that clients create from a submitted draft.
pub trait Creatable: Record {
    /// Create/replace payload as submitted by clients.
    type Draft: DeserializeOwned + Send + 'static;

    /// Build and validate a new record.
    fn from_draft(id: Uuid, draft: Self::Draft, now: DateTime<Utc>) -> DomainResult<Self>;
}

/// A record that may be replaced (`PUT`) or partially updated (`PATCH`).
///
/// Implementations validate the result and leave `self` untouched on error.
pub trait Editable: Creatable {
    type Patch: DeserializeOwned + Send + 'static;

    fn replace(&mut self, draft: Self::Draft, now: DateTime<Utc>) -> DomainResult<()>;

    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>) -> DomainResult<()>;
}

/// Creation/modification timestamps carried by every record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Note {
        id: Uuid,
        title: String,
        body: String,
    }

    impl Record for Note {
        const RESOURCE: &'static str = "notes";

        fn record_id(&self) -> Uuid {
            self.id
        }

        fn search_fields(&self) -> Vec<&str> {
            vec![self.title.as_str(), self.body.as_str()]
        }
    }

    fn note() -> Note {
        Note {
            id: Uuid::now_v7(),
            title: "Foundation pour".to_string(),
            body: "Pump truck booked".to_string(),
        }
    }

    #[test]
    fn text_match_is_case_insensitive_over_all_fields() {
        let n = note();
        assert!(n.matches_text("FOUNDATION"));
        assert!(n.matches_text("  truck "));
        assert!(!n.matches_text("roofing"));
    }

    #[test]
    fn empty_needle_matches() {
        assert!(note().matches_text(""));
        assert!(note().matches_text("   "));
    }
}
