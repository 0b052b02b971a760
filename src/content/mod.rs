//! Portfolio content: models, storage and initial data

pub mod models;
pub mod seed;
mod store;

pub use models::*;
pub use store::{group_skills, ContentStore, InMemoryContentStore};
