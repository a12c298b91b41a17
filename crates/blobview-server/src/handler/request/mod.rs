//! Request types for HTTP handlers.

mod viewer;

pub use viewer::ViewerForm;
