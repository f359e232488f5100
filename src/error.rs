//! Error types shared by every fallible operation of the crate.

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur when building, evaluating or training a network.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A neuron index is out of range or refers to a vacant slot.
    Index {
        /// The offending index.
        index: usize,
    },
    /// An input, output or error vector does not match the network's
    /// corresponding dimension.
    Shape {
        /// The dimension the network expects.
        expected: usize,
        /// The length that was provided.
        got: usize,
    },
    /// An internal consistency rule was violated.
    Invariant(&'static str),
    /// Invalid build-time configuration.
    Config(String),
    /// Text deserialisation failure.
    Parse {
        /// One-based line number of the offending input line.
        line: usize,
        /// Human-readable description of the failure.
        message: String,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index { index } => write!(f, "no neuron at index {index}"),
            Self::Shape { expected, got } => {
                write!(f, "dimension mismatch: expected {expected} values, got {got}")
            }
            Self::Invariant(message) => write!(f, "invariant violation: {message}"),
            Self::Config(message) => write!(f, "invalid configuration: {message}"),
            Self::Parse { line, message } => write!(f, "parse error at line {line}: {message}"),
        }
    }
}

impl std::error::Error for Error {}
