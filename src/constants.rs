//! Common constants used across luyview.
//!
//! These mirror the fixed vocabulary of the LUY export format and the
//! defaults applied when a record omits a system field.

/// Placeholder used for missing textual metamodel attributes.
pub const UNKNOWN_PLACEHOLDER: &str = "<unknown>";

/// Placeholder used for missing element URIs and user names.
pub const UNKNOWN_ELEMENT_TEXT: &str = "<UNKNOWN>";

/// Declared type marking an interface-direction feature.
pub const INTERFACE_DIRECTION_TYPE: &str = "io.luy.model.Direction";

/// Prefix of every declared enumeration type.
pub const ENUMERATION_TYPE_PREFIX: &str = "io.luy.model.attribute.EnumAT.";

/// Declared types that never denote a relation.
pub const NON_RELATION_TYPE_NAMES: [&str; 8] = [
    "boolean",
    "date",
    "date_time",
    "decimal",
    "integer",
    INTERFACE_DIRECTION_TYPE,
    "richtext",
    "string",
];

/// Feature names that always reference the owning type itself.
pub const SELF_RELATION_FEATURE_NAMES: [&str; 8] = [
    "children",
    "parent",
    "baseComponents",
    "parentComponents",
    "predecessors",
    "successors",
    "generalisation",
    "specialisations",
];

/// Record key naming the type expression of a record group.
pub const RECORD_GROUP_TYPE_KEY: &str = "query";
/// Record key holding the elements of a record group.
pub const RECORD_GROUP_ELEMENTS_KEY: &str = "result";

pub const ID_KEY: &str = "id";
pub const NAME_KEY: &str = "name";
pub const DESCRIPTION_KEY: &str = "description";
pub const ELEMENT_URI_KEY: &str = "elementURI";
pub const LAST_MODIFICATION_TIME_KEY: &str = "lastModificationTime";
pub const LAST_MODIFICATION_USER_KEY: &str = "lastModificationUser";
pub const HIERARCHY_LEVEL_KEY: &str = "$$hierarchy_level$$";
pub const POSITION_KEY: &str = "position";

/// Suffix of a session's schema document.
pub const METAMODEL_FILE_SUFFIX: &str = "_metamodel.json";
/// Suffix of a session's records document.
pub const DATA_FILE_SUFFIX: &str = "_data.json";

/// Default directory holding session documents.
pub const DEFAULT_DATA_DIR: &str = "data";
/// Default configuration file read by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "luyview.toml";
