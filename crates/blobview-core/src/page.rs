//! Listing pages and page size bounds.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::token::ContinuationToken;

/// One page of image names returned by a listing call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Image names in listing order.
    pub items: Vec<String>,
    /// Token for the following page, `None` when this is the last page.
    pub next: Option<ContinuationToken>,
}

impl ListPage {
    /// Creates a page from its items and next token.
    pub fn new(items: Vec<String>, next: Option<ContinuationToken>) -> Self {
        Self { items, next }
    }

    /// Returns whether the page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Number of blobs requested per listing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageSize(u32);

impl PageSize {
    /// Smallest accepted page size.
    pub const MIN: u32 = 3;
    /// Largest accepted page size.
    pub const MAX: u32 = 60;
    /// Page size used when none is configured.
    pub const DEFAULT: Self = Self(12);

    /// Validates and wraps a page size.
    pub fn new(value: u32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::PageSizeOutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    /// Clamps any value into the accepted range.
    pub fn saturating(value: u32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    /// Returns the page size as an integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for PageSize {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PageSize> for u32 {
    fn from(value: PageSize) -> Self {
        value.0
    }
}
