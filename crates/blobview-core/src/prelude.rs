//! Prelude module for convenient imports.

pub use crate::cursor::PageCursor;
pub use crate::error::{Error, Result};
pub use crate::image::{content_type_for, is_image_name};
pub use crate::page::{ListPage, PageSize};
pub use crate::signature::{QueryInputs, QuerySignature};
pub use crate::token::ContinuationToken;
