#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod cursor;
mod error;
mod image;
mod page;
mod signature;
mod token;

#[doc(hidden)]
pub mod prelude;

pub use cursor::PageCursor;
pub use error::{Error, Result};
pub use image::{IMAGE_EXTENSIONS, content_type_for, is_image_name};
pub use page::{ListPage, PageSize};
pub use signature::{QueryInputs, QuerySignature};
pub use token::ContinuationToken;

/// Tracing target for core operations.
pub const TRACING_TARGET: &str = "blobview_core";
