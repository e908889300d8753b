//! Generic object transcoder between API-model structs and tri-state
//! config-model structs.
//!
//! ```ignore
//! use autoflex::{Attr, Record};
//!
//! #[derive(Record, Default)]
//! pub struct BucketModel {
//!     pub name: Attr<String>,
//!     pub versions: Attr<Vec<String>>,
//! }
//!
//! #[derive(Record, Default)]
//! pub struct Bucket {
//!     pub name: Option<String>,
//!     pub versions: Vec<String>,
//! }
//!
//! let mut model = BucketModel::default();
//! autoflex::flatten(&api_bucket, &mut model)?;
//! ```

extern crate self as autoflex;

pub mod attr;
pub mod config;
pub mod error;
pub mod flex;
pub mod flexer;
pub mod registry;
pub mod rules;
pub mod schema;
pub mod value;
pub mod visitor;
pub mod walker;

pub use autoflex_derive::Record;

pub use attr::{Attr, Set};
pub use config::Options;
pub use error::{ErrorKind, FlexError};
pub use flex::{Flex, Record};
pub use flexer::{expand, flatten, Flexer};
pub use registry::{CoercionRule, Context, Registry};
pub use value::Value;
pub use visitor::{Direction, ExpandVisitor, FlattenVisitor, Visitor};
