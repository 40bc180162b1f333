//! Service layer for kova-preview
//!
//! Stateless external-API clients plus the pipeline that sequences them.

pub mod concept_client;
pub mod image_client;
pub mod pipeline;
pub mod research_client;
pub mod storage;

pub use concept_client::{ConceptClient, ConceptError};
pub use image_client::{ImageClient, ImageError};
pub use pipeline::PreviewPipeline;
pub use research_client::{ResearchClient, ResearchError, RESEARCH_PLACEHOLDER};
pub use storage::{BlobStorage, StorageError};
