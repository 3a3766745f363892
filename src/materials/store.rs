//! Material store abstraction.

use async_trait::async_trait;

use crate::types::{Material, MaterialType};

use super::error::StoreResult;

/// Filter for a material lookup. Results are always newest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialQuery {
    /// Case-insensitive substring match on the subject.
    pub subject: Option<String>,
    /// Exact material type.
    pub material_type: Option<MaterialType>,
    /// Maximum number of rows.
    pub limit: usize,
}

impl MaterialQuery {
    /// Query for the newest `limit` materials, unfiltered.
    #[must_use]
    pub const fn latest(limit: usize) -> Self {
        Self {
            subject: None,
            material_type: None,
            limit,
        }
    }

    /// Restrict to a subject.
    #[must_use]
    pub fn with_subject(mut self, subject: Option<String>) -> Self {
        self.subject = subject.filter(|s| !s.trim().is_empty());
        self
    }

    /// Restrict to a material type.
    #[must_use]
    pub const fn with_type(mut self, material_type: Option<MaterialType>) -> Self {
        self.material_type = material_type;
        self
    }
}

/// Read-only access to learning materials.
#[async_trait]
pub trait MaterialStore: Send + Sync {
    /// Fetch materials matching `query`, newest first, at most `query.limit`.
    ///
    /// # Errors
    /// Returns an error if the store cannot be queried.
    async fn fetch_materials(&self, query: &MaterialQuery) -> StoreResult<Vec<Material>>;
}
