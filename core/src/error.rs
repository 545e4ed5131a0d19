//! Error types for schema registration, matching and file inclusion.
//!
//! Registration conflicts ([`SchemaError`]) are programming errors in the
//! host application. Match and include failures ([`MatchError`],
//! [`IncludeError`]) describe problems in the user-supplied argument list and
//! always name the offending argument together with its token index or file.

use std::path::PathBuf;

use thiserror::Error;

use crate::value::ValueKind;

/// An argument name was requested with a shape incompatible with an earlier
/// request for the same name in the same scope.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// Same name, different variant or value type.
    #[error("argument: {name} is already defined as {registered}, not as {requested}")]
    KindConflict {
        name: String,
        registered: String,
        requested: String,
    },
    /// Same name and shape, but a different default.
    #[error("argument: {name} has already been defined with different default value: {registered}")]
    DefaultConflict { name: String, registered: String },
}

/// Structural violation found while matching tokens against the schema tree.
///
/// `index` is always the position at which the failing entry started, not
/// the position the scan had advanced to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// A scalar name is the last token.
    #[error("argument: {name} at index: {index} expects a {expected} value, not end of arguments")]
    MissingValue {
        name: String,
        index: usize,
        expected: ValueKind,
    },
    /// A scalar name is followed by a token of the wrong type.
    #[error("argument: {name} at index: {index} expects a {expected} value, not: {found}")]
    InvalidValue {
        name: String,
        index: usize,
        expected: ValueKind,
        found: String,
    },
    /// A context or string vector name is not followed by the opening bracket.
    #[error("expected {{ after argument: {name} at index: {index}, not: {}", .found.as_deref().unwrap_or("end of arguments"))]
    MissingContextBegin {
        name: String,
        index: usize,
        found: Option<String>,
    },
    /// The arguments ended before the closing bracket.
    #[error("expected }} at the end of argument: {name} opened at index: {index}, not end of arguments")]
    UnterminatedContext { name: String, index: usize },
    /// Every entry of the scope is used up but tokens remain.
    #[error("following arguments {} cannot be matched: {}", scope_suffix(.context.as_deref()), .remaining.join(" "))]
    UnmatchedTrailing {
        context: Option<String>,
        index: usize,
        remaining: Vec<String>,
    },
    /// No remaining entry of the scope starts at this token.
    #[error("argument: {argument} at index: {index} {} cannot be matched", scope_suffix(.context.as_deref()))]
    UnmatchedArgument {
        context: Option<String>,
        argument: String,
        index: usize,
    },
}

fn scope_suffix(context: Option<&str>) -> String {
    match context {
        Some(name) => format!("in context: {name}"),
        None => "at top level".to_string(),
    }
}

impl MatchError {
    /// Token index the diagnostic refers to.
    pub fn index(&self) -> usize {
        match self {
            Self::MissingValue { index, .. }
            | Self::InvalidValue { index, .. }
            | Self::MissingContextBegin { index, .. }
            | Self::UnterminatedContext { index, .. }
            | Self::UnmatchedTrailing { index, .. }
            | Self::UnmatchedArgument { index, .. } => *index,
        }
    }
}

/// Failure while splicing `< file` includes into the token stream.
#[derive(Debug, Error)]
pub enum IncludeError {
    /// The include symbol is the last token of the arguments or of the
    /// included `file`; `index` counts within that token list.
    #[error("expected filename after < at index: {index} {}, not end of arguments/file", source_suffix(.file.as_deref()))]
    MissingFilename { file: Option<String>, index: usize },
    /// The file is already being expanded further up the include chain.
    #[error("file: {file} contains file loading loop")]
    Cycle { file: String },
    /// The file could not be read.
    #[error("failed to read included file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// No file with that name exists in an in-memory source.
    #[error("included file not found: {file}")]
    NotFound { file: String },
}

fn source_suffix(file: Option<&str>) -> String {
    match file {
        Some(file) => format!("in file: {file}"),
        None => "in arguments".to_string(),
    }
}

/// A declarative schema that accessor calls could not have produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSchema {
    #[error("duplicate argument in scope: {name}")]
    DuplicateArgument { name: String },

    #[error("argument: {name} is a vector of {kind} values but has default {value}")]
    MistypedVectorDefault {
        name: String,
        kind: ValueKind,
        value: String,
    },

    #[error("argument: {name} is an unbracketed vector of string values; use a string_vector")]
    UnbracketedStringVector { name: String },
}

/// Umbrella error returned by the viewer.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Include(#[from] IncludeError),

    /// `argv` did not contain the application name.
    #[error("number of arguments has to be greater than 0")]
    EmptyArgv,
}

/// Convenience alias for results with [`ViewerError`].
pub type Result<T> = std::result::Result<T, ViewerError>;
