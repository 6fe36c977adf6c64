//! Wire models for the document manager.
//!
//! Maps database records to their JSON representation and parses request
//! bodies into validated inputs.

mod document;
mod folder;
mod topic;
mod validation;

pub use document::*;
pub use folder::*;
pub use topic::*;
pub use validation::*;

/// Maximum length of folder names, document titles and topic names.
pub const NAME_MAX_LENGTH: usize = 240;
