//! HTTP API handlers for kova-preview

pub mod health;
pub mod leads;
pub mod previews;

pub use health::health_routes;
pub use leads::lead_routes;
pub use previews::preview_routes;
