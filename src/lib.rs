//! # luyview
//!
//! Core of a viewer for LUY enterprise-architecture exports. A session export
//! consists of a schema document describing types, features and enumerations,
//! and a records document holding the elements. The viewer loads both into an
//! immutable entity graph and offers filtered, sorted and column-trimmed views
//! of each type.
//!
//! ## Core Components
//!
//! * `metamodel` - Types, features and enumerations of a session
//! * `datamodel` - Elements with coerced attribute values and resolved relations
//! * `rule` - Filter expressions and the operator registry
//! * `view` - Per-type filter, sort and visibility state with a memoized result
//! * `message_bus` - Typed notifications about view state changes
//! * `session` - Document sources and the session store
//! * `config` - Viewer configuration
//! * `logging` - Logger setup
//! * `error` - Error types and handling

pub mod config;
pub mod constants;
pub mod datamodel;
pub mod error;
pub mod logging;
pub mod message_bus;
pub mod metamodel;
pub mod rule;
pub mod session;
pub mod view;

pub use config::{ConfigError, ViewerConfig};
pub use datamodel::{AttributeValue, Element, ElementKey, EntityGraph, LoadOptions, Value};
pub use error::{LuyError, LuyResult};
pub use message_bus::{Event, MessageBus};
pub use metamodel::{Feature, FeatureKind, Metamodel, TypeExpression, TypeKey};
pub use rule::{Evaluatable, Filter, Group, GroupOperator, Operator, OperatorId, Rule, RuleValue};
pub use session::{session_label, DirectorySource, DocumentSource, SessionStore};
pub use view::{FilteredAndSortedView, SortOrder};
