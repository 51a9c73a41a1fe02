#![forbid(unsafe_code)]

pub mod catalog;
pub mod repository;

pub use catalog::{CatalogError, LevelCatalog, LevelRecord};
pub use repository::{InMemoryPremiumRepository, PremiumRepository, StorageError};
