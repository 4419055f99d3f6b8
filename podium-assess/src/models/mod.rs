//! Data models for podium-assess

pub mod assessment;
pub mod features;
pub mod upload_session;

pub use assessment::{
    AssessmentReport, AssessmentState, AssessmentStatus, BucketScore, ParameterScore,
};
pub use features::{AudioFeatures, NarrativeFeatures, VisualFeatures};
pub use upload_session::{UploadSession, UploadState};
