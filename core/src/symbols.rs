//! Reserved symbols and layout constants shared by every component.
//!
//! These never change at runtime. The lexer, include resolver, matcher and
//! usage dump all read them from here.

/// Token that opens a bracketed group (context or string vector).
pub const CONTEXT_BEGIN: &str = "{";

/// Token that closes a bracketed group.
pub const CONTEXT_END: &str = "}";

/// Token that marks the following token as a file to splice in.
pub const FILE_INCLUDE: &str = "<";

/// Prefix that turns a reserved symbol into a literal string value.
pub const ESCAPE: char = '\\';

/// Starts a line comment in argument files.
pub const COMMENT: char = '#';

/// Indentation added per nested context level in the usage dump.
pub const LEVEL_INDENT: usize = 2;

/// Line width at which vector defaults wrap in the usage dump.
pub const MAX_DATA_LINE_LENGTH: usize = 15;

/// Returns `true` for the three bare reserved symbols.
pub fn is_reserved(token: &str) -> bool {
    token == CONTEXT_BEGIN || token == CONTEXT_END || token == FILE_INCLUDE
}

/// Decodes `\{`, `\}` and `\<` into the bare symbol; anything else is returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use argview_core::symbols::decode_escape;
///
/// assert_eq!(decode_escape("\\{"), "{");
/// assert_eq!(decode_escape("\\x"), "\\x");
/// assert_eq!(decode_escape("plain"), "plain");
/// ```
pub fn decode_escape(token: &str) -> String {
    match token.strip_prefix(ESCAPE) {
        Some(rest) if is_reserved(rest) => rest.to_string(),
        _ => token.to_string(),
    }
}
