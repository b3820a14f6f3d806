//! Verification-core errors.
//!
//! Two severities share one type. *Reportable* errors describe a defect in
//! the program under verification (an ill-formed construct reached while
//! building a VC); the session converts them into a `FAILED` outcome with
//! the pinpointed construct. Everything else - names rejected up front,
//! unsupported constructs, solver misuse - is fatal and propagates as `Err`,
//! because continuing could silently weaken soundness.

use attest_ir::IrError;
use std::fmt;

/// Alias for `std::result::Result<T, VcgenError>`.
pub type VcgenResult<T = ()> = Result<T, VcgenError>;

/// The category of a verification-core error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcgenErrorKind {
    /// The IR is ill-formed at a specific statement or expression: a
    /// `Return` outside a procedure body, a call to an undefined
    /// procedure, an arity mismatch, a sort mismatch inside an expression.
    /// Reported as a verification failure, not a crash.
    IllFormed,

    /// A user name collides with the verifier's reserved symbol space.
    ReservedName,

    /// A name is used both as an integer and as an array.
    MixedSorts,

    /// An IR construct this generator does not implement. Fatal: emitting
    /// a VC for a construct with unknown semantics would be unsound.
    Unsupported,

    /// The solver backend misbehaved (as opposed to answering `unknown`,
    /// which is an [`crate::Outcome`], not an error).
    Solver,
}

/// An error from VC construction or the solver gateway.
#[derive(Debug, Clone)]
pub struct VcgenError {
    /// The category.
    pub kind: VcgenErrorKind,
    /// Human-readable description, naming the offending construct.
    pub message: String,
}

impl VcgenError {
    /// An ill-formed-IR error pinpointing `what`.
    pub fn ill_formed(what: impl Into<String>) -> Self {
        Self {
            kind: VcgenErrorKind::IllFormed,
            message: what.into(),
        }
    }

    /// An unsupported-construct error.
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self {
            kind: VcgenErrorKind::Unsupported,
            message: what.into(),
        }
    }

    /// A solver-backend error.
    pub fn solver(message: impl Into<String>) -> Self {
        Self {
            kind: VcgenErrorKind::Solver,
            message: message.into(),
        }
    }

    /// Whether this error describes the verified program (and should become
    /// a `FAILED` outcome) rather than a defect in the verifier's input
    /// handling or environment.
    pub fn is_reportable(&self) -> bool {
        self.kind == VcgenErrorKind::IllFormed
    }
}

impl fmt::Display for VcgenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            VcgenErrorKind::IllFormed => write!(f, "ill-formed program: {}", self.message),
            VcgenErrorKind::ReservedName | VcgenErrorKind::MixedSorts => {
                write!(f, "{}", self.message)
            }
            VcgenErrorKind::Unsupported => write!(f, "unsupported construct: {}", self.message),
            VcgenErrorKind::Solver => write!(f, "solver error: {}", self.message),
        }
    }
}

impl std::error::Error for VcgenError {}

impl From<IrError> for VcgenError {
    fn from(err: IrError) -> Self {
        let kind = match err {
            IrError::ReservedName { .. } => VcgenErrorKind::ReservedName,
            IrError::MixedSorts { .. } => VcgenErrorKind::MixedSorts,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ill_formed_is_reportable() {
        assert!(VcgenError::ill_formed("return r").is_reportable());
        assert!(!VcgenError::unsupported("goto").is_reportable());
        assert!(!VcgenError::solver("boom").is_reportable());
    }

    #[test]
    fn ir_errors_map_to_matching_kinds() {
        let err: VcgenError = IrError::MixedSorts { name: "a".into() }.into();
        assert_eq!(err.kind, VcgenErrorKind::MixedSorts);
        let err: VcgenError = IrError::ReservedName { name: "x_old".into() }.into();
        assert_eq!(err.kind, VcgenErrorKind::ReservedName);
    }
}
