//! Helper functions for rendering
//!
//! Date formatting and URL generation shared by the generator and the
//! feed artifacts.

mod date;
mod url;

pub use date::*;
pub use url::*;
