//! Error taxonomy for buffer operations.
//!
//! Every operation that can decline to act returns [`MatrixResult`], so a
//! caller can tell "nothing changed because the input was invalid" apart
//! from "nothing changed because nothing had to".

use crate::element::ElementKind;

/// Convenience result type used across the crate.
pub type MatrixResult<T> = Result<T, MatrixError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    /// Layer index beyond the buffer's layer count.
    #[error("layer {layer} is out of range (buffer has {layers} layers)")]
    LayerOutOfRange { layer: usize, layers: usize },

    /// Single-cell write outside the grid.
    #[error("position ({x}, {y}) is outside the buffer")]
    OutOfBounds { x: usize, y: usize },

    /// A shape that must lie fully inside the buffer does not.
    #[error("{0} is not fully inside the buffer")]
    NotInside(&'static str),

    /// The operation is not defined for this element kind.
    #[error("{operation} is not supported for {kind} elements")]
    Unsupported {
        operation: &'static str,
        kind: ElementKind,
    },

    #[error("quantile {0} is outside [0, 1]")]
    InvalidQuantile(f64),

    #[error("lookup table has {actual} entries, {expected} required")]
    LookupTableTooShort { expected: usize, actual: usize },

    #[error("structuring element has no set cell")]
    EmptyStructuringElement,

    /// Malformed descriptor or kernel data.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Configuration document that failed to parse.
    #[error("configuration error: {0}")]
    Config(String),
}

impl MatrixError {
    pub(crate) fn unsupported(operation: &'static str, kind: ElementKind) -> Self {
        Self::Unsupported { operation, kind }
    }

    pub(crate) fn geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }
}

impl From<serde_json::Error> for MatrixError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failure() {
        let err = MatrixError::unsupported("histogram", ElementKind::Float);
        assert_eq!(err.to_string(), "histogram is not supported for float elements");

        let err = MatrixError::LayerOutOfRange { layer: 3, layers: 1 };
        assert!(err.to_string().contains("layer 3"));
    }

    #[test]
    fn test_json_errors_become_config_errors() {
        let err: MatrixError = serde_json::from_str::<u8>("nope").unwrap_err().into();
        assert!(matches!(err, MatrixError::Config(_)));
    }
}
