use thiserror::Error;

/// Errors raised while building, discharging or completing a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontierRequestError {
    /// A request was built without naming the action it gates.
    #[error("Request action name is empty")]
    EmptyAction,

    /// No outstanding requirement has the requested type.
    #[error("No outstanding requirement of type {type_name}")]
    RequirementNotFound {
        /// Type name of the requirement that was asked for.
        type_name: &'static str,
    },

    /// The request still has requirements that were never discharged.
    #[error("Request for '{action}' has {remaining} outstanding requirement(s)")]
    IncompleteRequest {
        /// Action the request gates.
        action: String,
        /// Number of requirements still outstanding.
        remaining: usize,
    },

    /// The request was built against a different protocol version.
    #[error("Request version {actual} does not match engine version {expected}")]
    InvalidVersion {
        /// Version the engine accepts.
        expected: u64,
        /// Version the request carries.
        actual: u64,
    },
}
