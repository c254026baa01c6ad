//! Service layer for business logic.

pub mod hashing;
pub mod media_service;
pub mod upload_service;

pub use hashing::{fingerprint, fingerprint_or_none};
pub use media_service::{JournalSuggestion, MediaService, NewMedia};
pub use upload_service::{UploadOutcome, UploadRequest, UploadService};
