//! Error kinds raised by the scoring engine and its extraction boundary

use crate::Module;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading rules, scoring documents or extracting text
#[derive(Debug, Error)]
pub enum ScoringError {
    /// A criterion identifier was requested that the rule table does not define
    #[error("unknown criterion: {0}")]
    UnknownCriterion(String),

    /// Rule data failed validation at load time
    #[error("malformed rule data: {0}")]
    MalformedRuleData(String),

    /// A rule cannot be evaluated (it declares no tiers)
    #[error("invalid rule {id}: {reason}")]
    InvalidRule { id: String, reason: String },

    /// A checklist has no criteria, or every criterion has a zero maximum
    #[error("checklist {0} has no scorable criteria")]
    EmptyChecklist(Module),

    /// Classification needs a module result that was not supplied
    #[error("missing {0} checklist result required for classification")]
    MissingModule(Module),

    /// The text extraction collaborator could not read the file
    #[error("unreadable file {}: {reason}", .path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    /// The file type has no extractor
    #[error("unsupported format for {}: {hint}", .path.display())]
    UnsupportedFormat { path: PathBuf, hint: String },
}

pub type Result<T> = std::result::Result<T, ScoringError>;
