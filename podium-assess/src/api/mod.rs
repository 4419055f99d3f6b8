//! HTTP API handlers for podium-assess

pub mod assessment;
pub mod health;
pub mod sse;
pub mod upload;

pub use assessment::assessment_routes;
pub use health::health_routes;
pub use sse::event_stream;
pub use upload::upload_routes;
