//! Argument viewer: typed accessors that read values from the token stream
//! and record the expected shape of each argument as a side effect.
//!
//! The root [`ArgumentViewer`] owns the token sequence and the schema tree.
//! [`ArgumentScope::context`] hands out a [`ContextViewer`] that owns a copy
//! of the bracketed tokens and mutably borrows the context's node inside the
//! parent tree, so everything it registers shows up in the parent's usage
//! dump. Only the root can [`validate`](ArgumentViewer::validate).

use tracing::debug;

use crate::error::{Result, ViewerError};
use crate::matcher::match_all;
use crate::resolve::{FsLoader, SourceLoader, expand};
use crate::schema::{ArgumentList, SchemaNode};
use crate::symbols::{CONTEXT_BEGIN, CONTEXT_END, decode_escape};
use crate::value::{ArgValue, NumericArgValue};

/// Outcome of a value lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The argument was present and its value(s) converted.
    Found(T),
    /// The argument was absent or its value did not convert; this is the
    /// registered default.
    Defaulted(T),
}

impl<T> Lookup<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Found(value) | Self::Defaulted(value) => value,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Borrowed view of one scope, split so the schema can be mutated while the
/// tokens are read.
#[derive(Debug)]
pub struct ScopeParts<'a> {
    pub application_name: &'a str,
    pub tokens: &'a [String],
    pub schema: &'a mut ArgumentList,
}

/// Position of `name` in `tokens`, ignoring anything inside balanced
/// brackets. A `}` closing the scope ends the search.
fn find_top_level(tokens: &[String], name: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate() {
        if depth == 0 && token == name {
            return Some(index);
        }
        if token == CONTEXT_BEGIN {
            depth += 1;
        } else if token == CONTEXT_END {
            if depth == 0 {
                return None;
            }
            depth -= 1;
        }
    }
    None
}

/// Tokens strictly between the brackets that follow `name`, or `None` when
/// `name` is absent, not followed by `{`, or the group is unterminated.
fn capture_group(tokens: &[String], name: &str) -> Option<Vec<String>> {
    let index = find_top_level(tokens, name)?;
    if tokens.get(index + 1).map(String::as_str) != Some(CONTEXT_BEGIN) {
        return None;
    }
    let body = index + 2;
    let mut depth = 0usize;
    for (offset, token) in tokens[body..].iter().enumerate() {
        if token == CONTEXT_END {
            if depth == 0 {
                return Some(tokens[body..body + offset].to_vec());
            }
            depth -= 1;
        } else if token == CONTEXT_BEGIN {
            depth += 1;
        }
    }
    None
}

/// Fills missing trailing positions from `defaults`.
fn pad_with_defaults<T: Clone>(mut values: Vec<T>, defaults: &[T]) -> Vec<T> {
    if values.len() < defaults.len() {
        values.extend_from_slice(&defaults[values.len()..]);
    }
    values
}

/// Accessors shared by the root viewer and every context viewer.
///
/// Each accessor first registers the argument in this scope's schema
/// (failing on a conflicting earlier registration), then looks the value up
/// directly in the tokens without consuming anything.
pub trait ArgumentScope {
    fn parts(&mut self) -> ScopeParts<'_>;

    /// Tokens of this scope.
    fn tokens(&self) -> &[String];

    /// Schema registered in this scope so far.
    fn schema(&self) -> &ArgumentList;

    /// Usage listing of this scope and everything below it.
    fn usage(&self) -> String {
        self.schema().usage()
    }

    /// Registers a presence flag and reports whether it occurs.
    fn is_present(&mut self, name: &str, comment: &str) -> Result<bool> {
        let parts = self.parts();
        parts.schema.register(SchemaNode::flag(name, comment))?;
        Ok(find_top_level(parts.tokens, name).is_some())
    }

    /// Registers a single-value argument and returns its value.
    fn scalar<T: ArgValue>(&mut self, name: &str, default: T, comment: &str) -> Result<Lookup<T>> {
        let parts = self.parts();
        parts
            .schema
            .register(SchemaNode::scalar(name, default.clone().into_value(), comment))?;

        let found = find_top_level(parts.tokens, name)
            .and_then(|index| parts.tokens.get(index + 1))
            .and_then(|token| T::from_token(token));
        Ok(match found {
            Some(value) => Lookup::Found(value),
            None => Lookup::Defaulted(default),
        })
    }

    /// Registers a numeric vector argument and returns the run of values
    /// after it, padded with the tail of `default` when shorter.
    fn vector<T: NumericArgValue>(
        &mut self,
        name: &str,
        default: Vec<T>,
        comment: &str,
    ) -> Result<Lookup<Vec<T>>> {
        let parts = self.parts();
        let defaults = default.iter().cloned().map(T::into_value).collect();
        parts
            .schema
            .register(SchemaNode::vector(name, T::KIND, defaults, comment))?;

        let Some(index) = find_top_level(parts.tokens, name) else {
            return Ok(Lookup::Defaulted(default));
        };
        if index + 1 >= parts.tokens.len() {
            return Ok(Lookup::Defaulted(default));
        }
        let values: Vec<T> = parts.tokens[index + 1..]
            .iter()
            .map_while(|token| T::from_token(token))
            .collect();
        Ok(Lookup::Found(pad_with_defaults(values, &default)))
    }

    /// Registers a bracketed string vector and returns its words with escapes
    /// decoded.
    fn get_string_vector(
        &mut self,
        name: &str,
        default: Vec<String>,
        comment: &str,
    ) -> Result<Vec<String>> {
        let parts = self.parts();
        parts
            .schema
            .register(SchemaNode::string_vector(name, default.clone(), comment))?;

        let Some(words) = capture_group(parts.tokens, name) else {
            return Ok(default);
        };
        Ok(pad_with_defaults(words, &default)
            .iter()
            .map(|word| decode_escape(word))
            .collect())
    }

    /// Registers a context and returns a viewer over its bracketed tokens.
    ///
    /// When the context is absent (or malformed) the viewer has no tokens and
    /// every accessor on it returns defaults.
    fn context(&mut self, name: &str, comment: &str) -> Result<ContextViewer<'_>> {
        let parts = self.parts();
        let tokens = capture_group(parts.tokens, name).unwrap_or_default();
        let schema = parts.schema.register_context(name, comment)?;
        Ok(ContextViewer {
            application_name: parts.application_name,
            tokens,
            schema,
        })
    }

    fn get_f32(&mut self, name: &str, default: f32, comment: &str) -> Result<f32> {
        self.scalar(name, default, comment).map(Lookup::into_inner)
    }

    fn get_f64(&mut self, name: &str, default: f64, comment: &str) -> Result<f64> {
        self.scalar(name, default, comment).map(Lookup::into_inner)
    }

    fn get_i32(&mut self, name: &str, default: i32, comment: &str) -> Result<i32> {
        self.scalar(name, default, comment).map(Lookup::into_inner)
    }

    fn get_i64(&mut self, name: &str, default: i64, comment: &str) -> Result<i64> {
        self.scalar(name, default, comment).map(Lookup::into_inner)
    }

    fn get_u32(&mut self, name: &str, default: u32, comment: &str) -> Result<u32> {
        self.scalar(name, default, comment).map(Lookup::into_inner)
    }

    fn get_u64(&mut self, name: &str, default: u64, comment: &str) -> Result<u64> {
        self.scalar(name, default, comment).map(Lookup::into_inner)
    }

    /// String value with `\{`, `\}` and `\<` decoded.
    fn get_string(&mut self, name: &str, default: &str, comment: &str) -> Result<String> {
        self.scalar(name, default.to_string(), comment)
            .map(|value| decode_escape(&value.into_inner()))
    }

    fn get_f32v(&mut self, name: &str, default: Vec<f32>, comment: &str) -> Result<Vec<f32>> {
        self.vector(name, default, comment).map(Lookup::into_inner)
    }

    fn get_f64v(&mut self, name: &str, default: Vec<f64>, comment: &str) -> Result<Vec<f64>> {
        self.vector(name, default, comment).map(Lookup::into_inner)
    }

    fn get_i32v(&mut self, name: &str, default: Vec<i32>, comment: &str) -> Result<Vec<i32>> {
        self.vector(name, default, comment).map(Lookup::into_inner)
    }

    fn get_i64v(&mut self, name: &str, default: Vec<i64>, comment: &str) -> Result<Vec<i64>> {
        self.vector(name, default, comment).map(Lookup::into_inner)
    }

    fn get_u32v(&mut self, name: &str, default: Vec<u32>, comment: &str) -> Result<Vec<u32>> {
        self.vector(name, default, comment).map(Lookup::into_inner)
    }

    fn get_u64v(&mut self, name: &str, default: Vec<u64>, comment: &str) -> Result<Vec<u64>> {
        self.vector(name, default, comment).map(Lookup::into_inner)
    }
}

/// Top-level viewer over a program's arguments.
///
/// # Examples
///
/// ```
/// use argview_core::{ArgumentScope, ArgumentViewer};
///
/// let tokens = ["--threads", "8", "--render", "{", "--width", "640", "}"]
///     .map(String::from)
///     .to_vec();
/// let mut args = ArgumentViewer::new("app", tokens);
///
/// let threads = args.get_u32("--threads", 1, "worker count").unwrap();
/// let width = args
///     .context("--render", "output")
///     .unwrap()
///     .get_u32("--width", 320, "")
///     .unwrap();
/// assert_eq!((threads, width), (8, 640));
/// assert!(args.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ArgumentViewer {
    application_name: String,
    tokens: Vec<String>,
    schema: ArgumentList,
}

impl ArgumentViewer {
    /// Viewer over already expanded tokens with an empty schema.
    pub fn new(application_name: impl Into<String>, tokens: Vec<String>) -> Self {
        Self::with_schema(application_name, tokens, ArgumentList::new())
    }

    /// Viewer that starts from a previously built or loaded schema.
    pub fn with_schema(
        application_name: impl Into<String>,
        tokens: Vec<String>,
        schema: ArgumentList,
    ) -> Self {
        Self {
            application_name: application_name.into(),
            tokens,
            schema,
        }
    }

    /// Builds a viewer from a process argument vector.
    ///
    /// The first element is the application name; the rest are expanded
    /// through `< file` includes read from disk.
    ///
    /// # Errors
    ///
    /// [`ViewerError::EmptyArgv`] when `argv` is empty, or an include error.
    pub fn from_args<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_args_with_loader(argv, &FsLoader::new())
    }

    /// Like [`from_args`](Self::from_args), reading includes through `loader`.
    pub fn from_args_with_loader<I, S, L>(argv: I, loader: &L) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        L: SourceLoader + ?Sized,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let application_name = argv.next().ok_or(ViewerError::EmptyArgv)?;
        let tokens = expand(argv.collect(), loader)?;
        debug!(
            application = %application_name,
            tokens = tokens.len(),
            "loaded arguments"
        );
        Ok(Self::new(application_name, tokens))
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    /// Number of tokens, excluding the application name.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn argument(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    pub fn into_schema(self) -> ArgumentList {
        self.schema
    }

    /// Checks that every token is consumed by exactly one registered
    /// argument.
    ///
    /// # Errors
    ///
    /// The first [`MatchError`](crate::MatchError) in scan order.
    pub fn validate(&self) -> Result<()> {
        match_all(&self.schema, &self.tokens)?;
        debug!(tokens = self.tokens.len(), "arguments validated");
        Ok(())
    }

    /// `true` when [`validate`](Self::validate) succeeds.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl ArgumentScope for ArgumentViewer {
    fn parts(&mut self) -> ScopeParts<'_> {
        ScopeParts {
            application_name: &self.application_name,
            tokens: &self.tokens,
            schema: &mut self.schema,
        }
    }

    fn tokens(&self) -> &[String] {
        &self.tokens
    }

    fn schema(&self) -> &ArgumentList {
        &self.schema
    }
}

/// Viewer over the inside of one bracketed context.
///
/// Owns its tokens; borrows its schema from the enclosing scope.
#[derive(Debug)]
pub struct ContextViewer<'a> {
    application_name: &'a str,
    tokens: Vec<String>,
    schema: &'a mut ArgumentList,
}

impl ContextViewer<'_> {
    pub fn application_name(&self) -> &str {
        self.application_name
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl ArgumentScope for ContextViewer<'_> {
    fn parts(&mut self) -> ScopeParts<'_> {
        ScopeParts {
            application_name: self.application_name,
            tokens: &self.tokens,
            schema: &mut *self.schema,
        }
    }

    fn tokens(&self) -> &[String] {
        &self.tokens
    }

    fn schema(&self) -> &ArgumentList {
        &*self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;

    fn viewer(text: &str) -> ArgumentViewer {
        ArgumentViewer::new("app", text.split_whitespace().map(String::from).collect())
    }

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_find_top_level_skips_nested_groups() {
        let tokens = words("--ctx { --n 1 } --n 2");
        assert_eq!(find_top_level(&tokens, "--n"), Some(5));
        assert_eq!(find_top_level(&words("} --n 1"), "--n"), None);
    }

    #[test]
    fn test_capture_group_handles_nesting() {
        let tokens = words("--a { x { y } z } tail");
        assert_eq!(capture_group(&tokens, "--a"), Some(words("x { y } z")));
        assert_eq!(capture_group(&words("--a { x"), "--a"), None);
        assert_eq!(capture_group(&words("--a x"), "--a"), None);
    }

    #[test]
    fn test_scalar_found_and_defaulted() {
        let mut args = viewer("--count 5 --ratio x");
        assert_eq!(args.scalar("--count", 1i32, "").unwrap(), Lookup::Found(5));
        assert_eq!(
            args.scalar("--ratio", 0.5f32, "").unwrap(),
            Lookup::Defaulted(0.5)
        );
        assert_eq!(args.get_u64("--absent", 9, "").unwrap(), 9);
    }

    #[test]
    fn test_scalar_name_as_last_token_defaults() {
        let mut args = viewer("--count");
        assert_eq!(args.get_i32("--count", 3, "").unwrap(), 3);
    }

    #[test]
    fn test_string_scalar_decodes_escape() {
        let mut args = viewer("--open \\{");
        assert_eq!(args.get_string("--open", "", "").unwrap(), "{");
    }

    #[test]
    fn test_vector_pads_with_defaults() {
        let mut args = viewer("--size 800 --fast");
        assert_eq!(
            args.get_u32v("--size", vec![640, 480], "").unwrap(),
            vec![800, 480]
        );
    }

    #[test]
    fn test_vector_absent_returns_default() {
        let mut args = viewer("--fast");
        let lookup = args.vector("--size", vec![1.0f64], "").unwrap();
        assert_eq!(lookup, Lookup::Defaulted(vec![1.0]));
    }

    #[test]
    fn test_vector_stops_at_mistyped_token() {
        let mut args = viewer("--ids 1 2 x 3");
        assert_eq!(args.get_i64v("--ids", vec![], "").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_string_vector_reads_bracketed_words() {
        let mut args = viewer("--files { a.txt \\} b.txt }");
        assert_eq!(
            args.get_string_vector("--files", vec![], "").unwrap(),
            words("a.txt } b.txt")
        );
    }

    #[test]
    fn test_string_list_does_not_swallow_following_flag() {
        let mut args = viewer("--names { a b } --verbose");
        assert_eq!(
            args.get_string_vector("--names", vec![], "").unwrap(),
            words("a b")
        );
        assert!(args.is_present("--verbose", "").unwrap());
        assert!(args.validate().is_ok());

        let mut args = viewer("--ids 1 2 --verbose");
        assert_eq!(args.get_u32v("--ids", vec![], "").unwrap(), vec![1, 2]);
        assert!(args.is_present("--verbose", "").unwrap());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_string_vector_defaults_when_unbracketed() {
        let mut args = viewer("--files a.txt");
        let default = words("x");
        assert_eq!(
            args.get_string_vector("--files", default.clone(), "").unwrap(),
            default
        );
    }

    #[test]
    fn test_is_present_ignores_nested_occurrence() {
        let mut args = viewer("--ctx { --verbose }");
        assert!(!args.is_present("--verbose", "").unwrap());
        assert!(args.context("--ctx", "").unwrap().is_present("--verbose", "").unwrap());
    }

    #[test]
    fn test_conflicting_registration_fails() {
        let mut args = viewer("");
        args.get_i32("--n", 1, "").unwrap();
        args.get_i32("--n", 1, "").unwrap();
        let err = args.get_i32("--n", 2, "").unwrap_err();
        assert!(matches!(
            err,
            ViewerError::Schema(SchemaError::DefaultConflict { .. })
        ));
        let err = args.get_f32("--n", 1.0, "").unwrap_err();
        assert!(matches!(
            err,
            ViewerError::Schema(SchemaError::KindConflict { .. })
        ));
    }

    #[test]
    fn test_context_registers_into_parent_tree() {
        let mut args = viewer("--group { --n 3 }");
        {
            let mut group = args.context("--group", "grouped").unwrap();
            assert_eq!(group.get_i32("--n", 0, "").unwrap(), 3);
            assert_eq!(group.tokens(), words("--n 3").as_slice());
        }
        let node = args.schema().get("--group").unwrap();
        assert!(node.children().unwrap().contains("--n"));
        assert!(args.usage().contains("--group { - grouped"));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_absent_context_yields_defaults() {
        let mut args = viewer("");
        let mut group = args.context("--group", "").unwrap();
        assert!(group.is_empty());
        assert_eq!(group.get_i32("--n", 7, "").unwrap(), 7);
    }

    #[test]
    fn test_validate_reports_unknown_argument() {
        let mut args = viewer("--n 1 --unknown");
        args.get_i32("--n", 0, "").unwrap();
        let err = args.validate().unwrap_err();
        assert!(err.to_string().contains("--unknown"));
        assert!(!args.is_valid());
    }

    #[test]
    fn test_from_args_requires_application_name() {
        let err = ArgumentViewer::from_args(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, ViewerError::EmptyArgv));
    }

    #[test]
    fn test_from_args_expands_includes() {
        let loader = crate::resolve::MemoryLoader::new().with_file("opts", "--n 4");
        let args = ArgumentViewer::from_args_with_loader(["app", "<", "opts"], &loader).unwrap();
        assert_eq!(args.application_name(), "app");
        assert_eq!(args.len(), 2);
        assert_eq!(args.argument(1), Some("4"));
    }
}
