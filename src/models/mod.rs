//! Domain records for kova-preview

pub mod lead;
pub mod preview;

pub use lead::{Lead, LeadStatus};
pub use preview::{FeatureSection, PageSection, Preview, PreviewConcept, PreviewStatus};
