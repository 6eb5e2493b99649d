//! Integration testing module
//!
//! End-to-end tests for track construction:
//! - Timeline accumulation across documents
//! - Language consistency
//! - Image embedding and subsample sizes
//! - Sample entry fields
