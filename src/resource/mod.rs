//! Embedded image resources
//!
//! Image references found in a document are renamed to internal identifiers
//! and their bytes are later appended to the document's sample.

pub mod fetch;
pub mod rewrite;

pub use fetch::{resolve_reference, DefaultFetcher, ResourceFetcher};
pub use rewrite::{
    classify_mime, image_extension, rewrite_images, ImageReference, RewrittenDocument,
    BACKGROUND_IMAGE, SMPTE_TT_NAMESPACE,
};
