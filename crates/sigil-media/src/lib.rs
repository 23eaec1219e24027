//! Sigil Media: the boundary to the external media store.
//!
//! The rest of the system only sees [`MediaUploader`]: a fallible,
//! bounded upload call that yields a content reference or nothing.

mod uploader;

pub use uploader::{HttpMediaUploader, MediaConfig, MediaRef, MediaUploader};
