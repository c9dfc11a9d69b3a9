/// Errors raised while validating a forecast configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("lists must be a non-empty list")]
    EmptyLists,

    #[error("list {0:?} appears more than once")]
    DuplicateList(String),

    #[error("lists and base_shares must be the same length ({lists} lists, {shares} shares)")]
    ShareLengthMismatch { lists: usize, shares: usize },

    #[error("base share for {list:?} must be a positive number, got {value}")]
    InvalidShare { list: String, value: f64 },

    #[error("{field} must be >= {minimum}, got {value}")]
    BelowMinimum {
        field: &'static str,
        minimum: u64,
        value: u64,
    },

    #[error("{field} out of range (value={value}): {reason}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Bloc members not in lists: {0:?}")]
    UnknownBlocMembers(Vec<String>),

    #[error("Bloc members appear in both blocs: {0:?}")]
    BlocOverlap(Vec<String>),

    #[error("Lists assigned to neither bloc: {0:?}")]
    UnassignedLists(Vec<String>),
}

/// Errors raised while running the simulation engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    /// A Dirichlet concentration is negative or not finite
    #[error("invalid Dirichlet concentration for {list:?}: {alpha}")]
    InvalidConcentration { list: String, alpha: f64 },
}
