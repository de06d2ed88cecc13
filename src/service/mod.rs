//! Domain services
//!
//! The material lifecycle engine and the read-side catalog. HTTP
//! handlers stay thin; every rule lives here.

pub mod catalog;
pub mod materials;

pub use catalog::{BrowseFilter, CatalogPage, CatalogService};
pub use materials::{MaterialDraft, MaterialService};
