//! File inclusion: replaces every `< file` pair in a token stream with the
//! tokens of that file, recursively.
//!
//! The set of files currently being expanded is threaded through the
//! recursion. A file is added before its tokens are expanded and removed
//! afterwards, so the same file may be included again at a later, unrelated
//! point, but never from inside itself.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::IncludeError;
use crate::lexer::tokenize;
use crate::symbols::FILE_INCLUDE;

/// Supplies the text of included files.
pub trait SourceLoader {
    /// Returns the full text of `file`.
    fn load(&self, file: &str) -> Result<String, IncludeError>;
}

/// Reads included files from disk as UTF-8.
///
/// Relative names are resolved against `base_dir` when one is set and
/// against the process working directory otherwise.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    base_dir: Option<PathBuf>,
}

impl FsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative include names against `dir`.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    fn resolve(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl SourceLoader for FsLoader {
    fn load(&self, file: &str) -> Result<String, IncludeError> {
        let path = self.resolve(file);
        std::fs::read_to_string(&path).map_err(|source| IncludeError::Read { path, source })
    }
}

/// In-memory file set, keyed by the exact name used after `<`.
///
/// # Examples
///
/// ```
/// use argview_core::{MemoryLoader, expand};
///
/// let loader = MemoryLoader::new().with_file("common.txt", "--threads 4");
/// let tokens = vec!["--fast".to_string(), "<".into(), "common.txt".into()];
/// let expanded = expand(tokens, &loader).unwrap();
/// assert_eq!(expanded, vec!["--fast", "--threads", "4"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file.
    pub fn with_file(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.insert(name.into(), text.into());
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, file: &str) -> Result<String, IncludeError> {
        self.files
            .get(file)
            .cloned()
            .ok_or_else(|| IncludeError::NotFound {
                file: file.to_string(),
            })
    }
}

/// Expands every `< file` pair in `tokens`.
///
/// # Errors
///
/// Returns [`IncludeError::MissingFilename`] when `<` is the last token,
/// [`IncludeError::Cycle`] when a file (directly or indirectly) includes
/// itself, and the loader's error when a file cannot be read.
pub fn expand<L>(tokens: Vec<String>, loader: &L) -> Result<Vec<String>, IncludeError>
where
    L: SourceLoader + ?Sized,
{
    let mut open = HashSet::new();
    expand_with(tokens, None, loader, &mut open)
}

/// `source` names the file `tokens` were read from, `None` for the
/// top-level arguments.
fn expand_with<L>(
    mut tokens: Vec<String>,
    source: Option<&str>,
    loader: &L,
    open: &mut HashSet<String>,
) -> Result<Vec<String>, IncludeError>
where
    L: SourceLoader + ?Sized,
{
    let mut index = 0;
    while index < tokens.len() {
        if tokens[index] != FILE_INCLUDE {
            index += 1;
            continue;
        }

        let Some(file) = tokens.get(index + 1).cloned() else {
            return Err(IncludeError::MissingFilename {
                file: source.map(String::from),
                index,
            });
        };
        if open.contains(&file) {
            return Err(IncludeError::Cycle { file });
        }

        let text = loader.load(&file)?;
        open.insert(file.clone());
        let included = expand_with(tokenize(&text), Some(file.as_str()), loader, open);
        open.remove(&file);
        let included = included?;

        debug!(
            file = %file,
            at = index,
            tokens = included.len(),
            "spliced included file"
        );

        // Spliced tokens are fully expanded already, so scanning resumes
        // right after them.
        let spliced = included.len();
        tokens.splice(index..index + 2, included);
        index += spliced;
    }

    Ok(tokens)
}
