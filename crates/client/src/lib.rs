//! Client code for stagecraft.
//!
//! This crate provides the reqwest-backed network for the cache worker and
//! the page-side flows: form validation and submission, repeatable form
//! fields, and the video annotation cache.

pub mod fetch;
pub mod forms;
pub mod video;

pub use fetch::{FetchClient, FetchConfig};
pub use forms::{
    ApplyRequest, BookRequest, FieldKind, FieldList, FieldListError, FormClient, FormError, FormKind, FormPayload,
    SubmitOutcome, ValidationError, is_valid_email, is_valid_video_url,
};
pub use video::{VideoAnnotation, VideoAnnotations, extract_video_id};
