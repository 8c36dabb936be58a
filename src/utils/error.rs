use thiserror::Error;

/// A specialized Result type for toolbox client operations.
pub type ToolboxResult<T> = Result<T, ToolboxError>;

/// Represents errors that can occur while loading, binding, or invoking
/// toolbox tools.
#[derive(Debug, Error)]
pub enum ToolboxError {
    /// The raw manifest body is not well-formed structured data
    #[error("Failed to parse manifest: {0}")]
    ManifestParse(String),

    /// The manifest is structurally valid but required fields are missing
    /// or mistyped; one entry per offending field
    #[error("Invalid manifest: {}", .0.join("; "))]
    ManifestValidation(Vec<String>),

    /// The manifest declares a scalar type outside the supported set
    #[error("Unsupported schema type: {0}")]
    UnsupportedType(String),

    /// A strict bind referenced parameters not declared by the tool
    #[error("Parameter(s) `{}` not defined by tool `{tool}`", names.join(", "))]
    UnknownParameter {
        /// Name of the tool the bind was attempted on
        tool: String,
        /// The unknown parameter names
        names: Vec<String>,
    },

    /// The parameter is already bound on this tool instance
    #[error("Parameter `{name}` already bound in tool `{tool}`")]
    AlreadyBound {
        /// Name of the tool the bind was attempted on
        tool: String,
        /// The conflicting parameter name
        name: String,
    },

    /// The parameter is resolved through authentication and can never be bound
    #[error("Parameter `{name}` of tool `{tool}` requires authentication and cannot be bound")]
    AlreadyAuthenticated {
        /// Name of the tool the bind was attempted on
        tool: String,
        /// The authenticated parameter name
        name: String,
    },

    /// A call-time argument collides with a previously bound parameter
    #[error("Argument `{name}` of tool `{tool}` is already bound and cannot be supplied again")]
    DuplicateArgument {
        /// Name of the invoked tool
        tool: String,
        /// The colliding argument name
        name: String,
    },

    /// Call arguments failed the input model's field checks; one entry per
    /// invalid field
    #[error("Invalid arguments: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Required authentication sources are not registered at call time
    #[error(
        "Parameter(s) `{}` of tool {tool} require authentication, but no valid \
         authentication sources are registered. Please register the required \
         sources before use.",
        params.join(", ")
    )]
    PermissionDenied {
        /// Name of the invoked tool
        tool: String,
        /// Parameters whose authentication requirements are unmet
        params: Vec<String>,
    },

    /// The service answered with a non-2xx HTTP status
    #[error("HTTP error {status}: {message}")]
    Transport {
        /// HTTP status code of the response
        status: u16,
        /// Response body or status description
        message: String,
    },

    /// The request could not be performed at all
    #[error("Connection error: {0}")]
    Connection(String),

    /// Internal invariant violation, e.g. a poisoned lock
    #[error("Internal error: {0}")]
    Internal(String),
}
