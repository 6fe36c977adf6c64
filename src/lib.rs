//! docmngr - Document manager service
//!
//! Folders form a hierarchy, documents live in folders, and topics tag
//! documents. Folders and documents are soft-deleted: hidden from every
//! read path but kept in storage.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod state;

pub use config::config;
pub use error::{Error, Result};
pub use state::AppState;
