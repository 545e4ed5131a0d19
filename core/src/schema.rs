//! The schema tree: what arguments the application expects, discovered one
//! accessor call at a time.
//!
//! An [`ArgumentList`] maps argument names to [`SchemaNode`]s. A
//! [`SchemaNode::Context`] owns a nested `ArgumentList`, which makes the
//! schema a tree. Names are unique within one list; requesting an existing
//! name again must use the same shape and default (see
//! [`ArgumentList::register`]).
//!
//! The tree serializes as a list of tagged entries so a schema can be saved
//! and matched later without the application that produced it.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InvalidSchema, SchemaError};
use crate::value::{Value, ValueKind};

/// One expected argument.
///
/// # Examples
///
/// ```
/// use argview_core::{SchemaNode, Value, ValueKind};
///
/// let node = SchemaNode::scalar("--count", Value::I32(1), "how many");
/// assert_eq!(node.name(), "--count");
/// assert_eq!(node.type_tag(), "i32");
///
/// let node = SchemaNode::vector("--ids", ValueKind::U32, vec![], "");
/// assert_eq!(node.type_tag(), "u32*");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaNode {
    /// Bare presence flag: `--verbose`.
    Flag {
        name: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        comment: String,
    },
    /// Name followed by exactly one typed value: `--count 5`.
    Scalar {
        name: String,
        default: Value,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        comment: String,
    },
    /// Name followed by a greedy run of typed values: `--ids 1 2 3`.
    Vector {
        name: String,
        value_kind: ValueKind,
        #[serde(default)]
        defaults: Vec<Value>,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        comment: String,
    },
    /// Name followed by a bracketed run of arbitrary words: `--files { a b }`.
    StringVector {
        name: String,
        #[serde(default)]
        defaults: Vec<String>,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        comment: String,
    },
    /// Name followed by a bracketed group matched against its own schema:
    /// `--camera { --fov 60 }`.
    Context {
        name: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        comment: String,
        #[serde(default)]
        children: ArgumentList,
    },
}

/// Variant and value type of a node, ignoring name, defaults and comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaShape {
    Flag,
    Scalar(ValueKind),
    Vector(ValueKind),
    StringVector,
    Context,
}

impl fmt::Display for SchemaShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => f.write_str("presence flag"),
            Self::Scalar(kind) => write!(f, "single {kind} value"),
            Self::Vector(kind) => write!(f, "vector of {kind} values"),
            Self::StringVector => f.write_str("vector of string values"),
            Self::Context => f.write_str("context"),
        }
    }
}

impl SchemaNode {
    pub fn flag(name: &str, comment: &str) -> Self {
        Self::Flag {
            name: name.to_string(),
            comment: comment.to_string(),
        }
    }

    pub fn scalar(name: &str, default: Value, comment: &str) -> Self {
        Self::Scalar {
            name: name.to_string(),
            default,
            comment: comment.to_string(),
        }
    }

    pub fn vector(name: &str, value_kind: ValueKind, defaults: Vec<Value>, comment: &str) -> Self {
        Self::Vector {
            name: name.to_string(),
            value_kind,
            defaults,
            comment: comment.to_string(),
        }
    }

    pub fn string_vector(name: &str, defaults: Vec<String>, comment: &str) -> Self {
        Self::StringVector {
            name: name.to_string(),
            defaults,
            comment: comment.to_string(),
        }
    }

    pub fn context(name: &str, comment: &str) -> Self {
        Self::Context {
            name: name.to_string(),
            comment: comment.to_string(),
            children: ArgumentList::new(),
        }
    }

    /// Adds a child entry to a context node; other variants are returned
    /// unchanged.
    pub fn with_child(mut self, child: SchemaNode) -> Self {
        if let Self::Context { children, .. } = &mut self {
            children.entries.insert(child.name().to_string(), child);
        }
        self
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Flag { name, .. }
            | Self::Scalar { name, .. }
            | Self::Vector { name, .. }
            | Self::StringVector { name, .. }
            | Self::Context { name, .. } => name,
        }
    }

    pub fn comment(&self) -> &str {
        match self {
            Self::Flag { comment, .. }
            | Self::Scalar { comment, .. }
            | Self::Vector { comment, .. }
            | Self::StringVector { comment, .. }
            | Self::Context { comment, .. } => comment,
        }
    }

    fn comment_mut(&mut self) -> &mut String {
        match self {
            Self::Flag { comment, .. }
            | Self::Scalar { comment, .. }
            | Self::Vector { comment, .. }
            | Self::StringVector { comment, .. }
            | Self::Context { comment, .. } => comment,
        }
    }

    pub fn shape(&self) -> SchemaShape {
        match self {
            Self::Flag { .. } => SchemaShape::Flag,
            Self::Scalar { default, .. } => SchemaShape::Scalar(default.kind()),
            Self::Vector { value_kind, .. } => SchemaShape::Vector(*value_kind),
            Self::StringVector { .. } => SchemaShape::StringVector,
            Self::Context { .. } => SchemaShape::Context,
        }
    }

    /// Type column of the usage dump; empty for flags and contexts.
    pub fn type_tag(&self) -> String {
        match self {
            Self::Flag { .. } | Self::Context { .. } => String::new(),
            Self::Scalar { default, .. } => default.kind().type_name().to_string(),
            Self::Vector { value_kind, .. } => format!("{}*", value_kind.type_name()),
            Self::StringVector { .. } => "string*".to_string(),
        }
    }

    /// Nested schema of a context node.
    pub fn children(&self) -> Option<&ArgumentList> {
        match self {
            Self::Context { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Registered default rendered on one line, for diagnostics.
    fn default_repr(&self) -> String {
        match self {
            Self::Flag { .. } | Self::Context { .. } => String::new(),
            Self::Scalar { default, .. } => default.to_string(),
            Self::Vector { defaults, .. } => join_values(defaults),
            Self::StringVector { defaults, .. } => defaults.join(" "),
        }
    }

    fn same_default(&self, other: &SchemaNode) -> bool {
        match (self, other) {
            (Self::Scalar { default: a, .. }, Self::Scalar { default: b, .. }) => a == b,
            (Self::Vector { defaults: a, .. }, Self::Vector { defaults: b, .. }) => a == b,
            (Self::StringVector { defaults: a, .. }, Self::StringVector { defaults: b, .. }) => {
                a == b
            }
            _ => true,
        }
    }
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Unordered set of uniquely named schema entries for one scope.
///
/// Entries iterate in name order, which is also the order the matcher tries
/// them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SchemaNode>", into = "Vec<SchemaNode>")]
pub struct ArgumentList {
    entries: BTreeMap<String, SchemaNode>,
}

impl ArgumentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaNode> {
        self.entries.values()
    }

    /// Inserts `node`, or checks it against the entry already registered
    /// under the same name.
    ///
    /// An existing entry wins, except that a missing comment is filled in
    /// from `node`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::KindConflict`] when the existing entry has a different
    /// variant or value type, [`SchemaError::DefaultConflict`] when it has a
    /// different default.
    ///
    /// # Examples
    ///
    /// ```
    /// use argview_core::{ArgumentList, SchemaError, SchemaNode, Value};
    ///
    /// let mut list = ArgumentList::new();
    /// list.register(SchemaNode::scalar("--n", Value::I32(1), "")).unwrap();
    /// list.register(SchemaNode::scalar("--n", Value::I32(1), "count")).unwrap();
    /// assert_eq!(list.get("--n").unwrap().comment(), "count");
    ///
    /// let err = list.register(SchemaNode::scalar("--n", Value::I32(2), "")).unwrap_err();
    /// assert!(matches!(err, SchemaError::DefaultConflict { .. }));
    /// ```
    pub fn register(&mut self, node: SchemaNode) -> Result<&mut SchemaNode, SchemaError> {
        let name = node.name().to_string();
        let registered = match self.entries.entry(name.clone()) {
            Entry::Vacant(slot) => {
                debug!(name = %name, shape = %node.shape(), "registered argument");
                return Ok(slot.insert(node));
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        if registered.shape() != node.shape() {
            return Err(SchemaError::KindConflict {
                name,
                registered: registered.shape().to_string(),
                requested: node.shape().to_string(),
            });
        }
        if !registered.same_default(&node) {
            return Err(SchemaError::DefaultConflict {
                name,
                registered: registered.default_repr(),
            });
        }
        if registered.comment().is_empty() && !node.comment().is_empty() {
            *registered.comment_mut() = node.comment().to_string();
        }
        Ok(registered)
    }

    /// Registers a context entry and returns its nested schema.
    pub fn register_context(
        &mut self,
        name: &str,
        comment: &str,
    ) -> Result<&mut ArgumentList, SchemaError> {
        match self.register(SchemaNode::context(name, comment))? {
            SchemaNode::Context { children, .. } => Ok(children),
            other => Err(SchemaError::KindConflict {
                name: name.to_string(),
                registered: other.shape().to_string(),
                requested: SchemaShape::Context.to_string(),
            }),
        }
    }

    /// Serializes the schema as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a schema previously written by [`to_json`](Self::to_json).
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

impl From<ArgumentList> for Vec<SchemaNode> {
    fn from(list: ArgumentList) -> Self {
        list.entries.into_values().collect()
    }
}

impl TryFrom<Vec<SchemaNode>> for ArgumentList {
    type Error = InvalidSchema;

    fn try_from(nodes: Vec<SchemaNode>) -> Result<Self, Self::Error> {
        let mut entries = BTreeMap::new();
        for node in nodes {
            if let SchemaNode::Vector {
                name,
                value_kind,
                defaults,
                ..
            } = &node
                && let Some(bad) = defaults.iter().find(|v| v.kind() != *value_kind)
            {
                return Err(InvalidSchema::MistypedVectorDefault {
                    name: name.clone(),
                    kind: *value_kind,
                    value: bad.to_string(),
                });
            }
            if let SchemaNode::Vector {
                name,
                value_kind: ValueKind::String,
                ..
            } = &node
            {
                return Err(InvalidSchema::UnbracketedStringVector { name: name.clone() });
            }
            let name = node.name().to_string();
            if entries.insert(name.clone(), node).is_some() {
                return Err(InvalidSchema::DuplicateArgument { name });
            }
        }
        Ok(Self { entries })
    }
}
