//! Argument lists validated against a schema discovered from the accessor
//! calls an application makes.
//!
//! The pieces, leaves first:
//!
//! - [`tokenize`]: splits argument-file text into words, dropping `#`
//!   comments.
//! - [`expand`]: splices `< file` includes into a token stream, detecting
//!   include cycles.
//! - [`SchemaNode`] / [`ArgumentList`]: the schema tree of flags, typed
//!   scalars, typed vectors, bracketed string vectors and nested contexts.
//! - [`match_all`]: greedy, order-independent matching of tokens against
//!   the schema tree.
//! - [`ArgumentViewer`]: typed accessors ([`ArgumentScope`]) that return
//!   values and record the schema as they go, then
//!   [`validate`](ArgumentViewer::validate) the whole argument list.
//!
//! # Example
//!
//! ```
//! use argview_core::*;
//!
//! let loader = MemoryLoader::new().with_file("camera.txt", "--fov 75 # degrees");
//! let argv = ["viewer", "--verbose", "--camera", "{", "<", "camera.txt", "}"];
//! let mut args = ArgumentViewer::from_args_with_loader(argv, &loader).unwrap();
//!
//! let verbose = args.is_present("--verbose", "print progress").unwrap();
//! let fov = args
//!     .context("--camera", "camera settings")
//!     .unwrap()
//!     .get_f32("--fov", 60.0, "field of view")
//!     .unwrap();
//!
//! assert!(verbose);
//! assert_eq!(fov, 75.0);
//! assert!(args.validate().is_ok());
//! assert!(args.usage().contains("--fov = 60 [f32] - field of view"));
//! ```

mod error;
mod lexer;
mod matcher;
mod resolve;
mod schema;
pub mod symbols;
mod usage;
mod value;
mod viewer;

pub use error::{IncludeError, InvalidSchema, MatchError, Result, SchemaError, ViewerError};
pub use lexer::tokenize;
pub use matcher::{MatchOutcome, match_all, match_node, match_scope};
pub use resolve::{FsLoader, MemoryLoader, SourceLoader, expand};
pub use schema::{ArgumentList, SchemaNode, SchemaShape};
pub use value::{ArgValue, NumericArgValue, Value, ValueKind};
pub use viewer::{ArgumentScope, ArgumentViewer, ContextViewer, Lookup, ScopeParts};
