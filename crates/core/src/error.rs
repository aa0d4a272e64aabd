use thiserror::Error;

/// Errors that can abort a generation run, a table, or a single artifact.
///
/// The fatality scope of each variant is documented on the variant; the CLI
/// uses the scope to decide whether a bulk run continues with the next table.
#[derive(Debug, Error)]
pub enum SculptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing prerequisite capability or malformed configuration.
    /// Fatal for the whole run, raised before any table is processed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Requested table or column absent from the schema. Fatal for that
    /// table only; bulk runs continue with the next table.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Conflicting definitions detected while composing a skeleton.
    /// Fatal for that table's artifacts, raised before any write.
    #[error("composition error: {0}")]
    Composition(#[from] CompositionError),

    /// Required stub/template missing, unreadable, or left with unfilled
    /// slots. Fatal for that artifact.
    #[error("render error: {0}")]
    Render(String),

    /// Write shortfall or unreachable destination path. Fatal for that
    /// artifact; never retried.
    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("invalid pattern `{pattern}`: {reason}")]
    Pattern { pattern: String, reason: String },
}

#[derive(Debug, Error)]
pub enum SchemaError {
    /// Distinguished from a table that exists with zero columns.
    #[error("table `{0}` not found in schema")]
    TableNotFound(String),

    #[error("schema source unreadable: {0}")]
    Unreadable(String),
}

/// Conflicts raised by the conflict resolver during skeleton composition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompositionError {
    #[error("alias `{alias}` already binds `{existing}`, cannot rebind to `{attempted}`")]
    AliasConflict {
        attempted: String,
        alias: String,
        existing: String,
    },

    #[error("name `{name}` already imported as `{existing_alias}`, cannot re-import as `{attempted_alias}`")]
    NameConflict {
        name: String,
        attempted_alias: String,
        existing_alias: String,
    },

    #[error("member `{name}` from {second_source} conflicts with customized definition from {first_source}: the two definitions are incompatible")]
    MemberRedefinition {
        name: String,
        first_source: String,
        second_source: String,
    },

    #[error("duplicate member `{0}`")]
    DuplicateMember(String),

    #[error("member `{0}` not found")]
    MemberNotFound(String),

    #[error("doc tag `{0}` collides with an existing structural member")]
    DuplicateTag(String),
}

pub type SculptResult<T> = Result<T, SculptError>;
