//! Learning-material recommendations: store access and request classification.

pub mod analysis;
pub mod error;
pub mod store;
pub mod supabase;

pub use analysis::{ClassifierError, MaterialClassifier};
pub use error::{StoreError, StoreResult};
pub use store::{MaterialQuery, MaterialStore};
pub use supabase::SupabaseStore;
