//! Memory browser: archive of previously generated posts
//!
//! Lists and full-text searches the backend-held archive. List requests
//! honour the category filter; search spans every category.

pub mod browser;

pub use browser::MemoryBrowser;
