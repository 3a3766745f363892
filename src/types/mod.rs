//! Core data model shared by the server and the client.

pub mod ids;
pub mod material;
pub mod message;

pub use ids::{MessageId, TurnId};
pub use material::{Material, MaterialAnalysis, MaterialType, UnknownMaterialType};
pub use message::{Message, Role};
