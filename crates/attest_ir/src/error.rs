//! IR-level errors.
//!
//! These cover the two classes of programs the IR layer rejects outright:
//! names that collide with the verifier's reserved symbol space, and names
//! used both as integers and as arrays.

use std::fmt;

/// Alias for `std::result::Result<T, IrError>`.
pub type IrResult<T = ()> = Result<T, IrError>;

/// An error detected while validating a [`crate::Program`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    /// A user-visible name falls in the verifier's reserved namespace
    /// (`ret`, `*_old`, `*_pre_call`, `*_<digits>`, `i_frame_*`).
    ReservedName {
        /// The offending variable name.
        name: String,
    },

    /// A name is used both as an integer and as an array.
    MixedSorts {
        /// The offending variable name.
        name: String,
    },
}

impl fmt::Display for IrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrError::ReservedName { name } => {
                write!(f, "variable name '{}' is reserved for verifier-internal symbols", name)
            }
            IrError::MixedSorts { name } => {
                write!(f, "variable '{}' is used both as an integer and as an array", name)
            }
        }
    }
}

impl std::error::Error for IrError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_variable() {
        let err = IrError::MixedSorts { name: "a".to_string() };
        assert!(err.to_string().contains("'a'"));
        let err = IrError::ReservedName { name: "x_old".to_string() };
        assert!(err.to_string().contains("'x_old'"));
    }
}
