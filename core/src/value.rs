//! Value kinds an argument can carry and the conversions between tokens and
//! typed values.
//!
//! Every scalar or vector schema entry is tagged with a [`ValueKind`]. The
//! matcher uses [`ValueKind::accepts`] to decide whether a token may follow an
//! argument name; the viewer uses [`ArgValue::from_token`] to turn the token
//! into the value handed back to the application.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::symbols::is_reserved;

static INTEGRAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("valid integral regex"));
static UNSIGNED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid unsigned regex"));
static FLOATING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?$")
        .expect("valid floating point regex")
});

/// Expected type of an argument value.
///
/// # Examples
///
/// ```
/// use argview_core::ValueKind;
///
/// assert!(ValueKind::I32.accepts("-12"));
/// assert!(!ValueKind::U32.accepts("-12"));
/// assert!(ValueKind::F32.accepts("3"));
/// assert!(ValueKind::F64.accepts("2.5e3"));
/// assert!(!ValueKind::String.accepts("{"));
/// assert_eq!(ValueKind::U64.type_name(), "u64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    F32,
    F64,
    I32,
    I64,
    U32,
    U64,
    String,
}

impl ValueKind {
    /// Short type tag used in diagnostics and the usage dump.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::String => "string",
        }
    }

    /// Returns `true` when `token` can be converted to this kind.
    ///
    /// Integral kinds also require the literal to fit the target width.
    /// Strings accept every token except the bare reserved symbols.
    pub fn accepts(self, token: &str) -> bool {
        match self {
            Self::F32 | Self::F64 => FLOATING.is_match(token),
            Self::I32 => INTEGRAL.is_match(token) && token.parse::<i32>().is_ok(),
            Self::I64 => INTEGRAL.is_match(token) && token.parse::<i64>().is_ok(),
            Self::U32 => UNSIGNED.is_match(token) && token.parse::<u32>().is_ok(),
            Self::U64 => UNSIGNED.is_match(token) && token.parse::<u64>().is_ok(),
            Self::String => !is_reserved(token),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A typed default value stored in the schema tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    F32(f32),
    F64(f64),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    String(String),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::F32(_) => ValueKind::F32,
            Self::F64(_) => ValueKind::F64,
            Self::I32(_) => ValueKind::I32,
            Self::I64(_) => ValueKind::I64,
            Self::U32(_) => ValueKind::U32,
            Self::U64(_) => ValueKind::U64,
            Self::String(_) => ValueKind::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

/// Rust types that can be requested through the typed accessors.
pub trait ArgValue: Clone + fmt::Debug + Sized {
    /// Kind recorded in the schema for this type.
    const KIND: ValueKind;

    /// Converts a token, or `None` when it is not of this type.
    fn from_token(token: &str) -> Option<Self>;

    /// Wraps the value for storage in the schema tree.
    fn into_value(self) -> Value;
}

mod sealed {
    pub trait Sealed {}
}

/// Numeric [`ArgValue`] types, the only ones a greedy vector may hold.
///
/// A run of strings would swallow the names of the arguments that follow
/// it, so string lists go through the bracketed
/// [`get_string_vector`](crate::ArgumentScope::get_string_vector) instead.
///
/// ```compile_fail
/// use argview_core::{ArgumentScope, ArgumentViewer};
///
/// let mut args = ArgumentViewer::new("app", vec![]);
/// let _ = args.vector("--names", Vec::<String>::new(), "");
/// ```
pub trait NumericArgValue: ArgValue + sealed::Sealed {}

macro_rules! numeric_arg_value {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl NumericArgValue for $ty {}

            impl ArgValue for $ty {
                const KIND: ValueKind = ValueKind::$kind;

                fn from_token(token: &str) -> Option<Self> {
                    if !Self::KIND.accepts(token) {
                        return None;
                    }
                    token.parse().ok()
                }

                fn into_value(self) -> Value {
                    Value::$kind(self)
                }
            }
        )*
    };
}

numeric_arg_value! {
    f32 => F32,
    f64 => F64,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
}

impl ArgValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_token(token: &str) -> Option<Self> {
        Self::KIND.accepts(token).then(|| token.to_string())
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}
