//! Verification verdicts and reports.
//!
//! Every VC yields exactly one [`Outcome`]:
//!
//! | Outcome | Meaning | Solver answer on ¬VC |
//! |---------|---------|----------------------|
//! | `Verified` | the VC is valid | `unsat` |
//! | `Failed` | a counterexample exists, or the VC could not be built | `sat` |
//! | `Unknown` | the solver gave up (timeout, quantifier blowup) | `unknown` |
//!
//! `Unknown` is deliberately *not* an error: it is a verdict the caller must
//! treat as "not verified".

use serde::Serialize;
use std::fmt;

/// Concrete variable assignments falsifying a VC.
///
/// `assignments` maps current-state program variables to the values the
/// solver chose; `model` is the solver's full model text, verbatim, which
/// additionally shows snapshot and havoc symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterExample {
    /// `(variable, value)` pairs for the program's own variables.
    pub assignments: Vec<(String, String)>,
    /// The solver's model, verbatim.
    pub model: String,
}

impl fmt::Display for CounterExample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.assignments.is_empty() {
            return write!(f, "{}", self.model.trim());
        }
        for (i, (var, val)) in self.assignments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", var, val)?;
        }
        Ok(())
    }
}

/// The verdict for a single VC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum Outcome {
    /// The VC is valid.
    Verified,
    /// The VC is falsifiable, or could not be constructed from the IR.
    Failed {
        /// Pinpointed construct when the VC could not be built.
        detail: Option<String>,
        /// The solver's witness when one exists.
        counterexample: Option<CounterExample>,
    },
    /// The solver could not decide within its budget.
    Unknown {
        /// The solver's own diagnostic.
        reason: String,
    },
}

impl Outcome {
    /// A `Failed` outcome.
    pub fn failed(detail: Option<String>, counterexample: Option<CounterExample>) -> Self {
        Outcome::Failed {
            detail,
            counterexample,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Outcome::Verified)
    }

    /// The one-word label of this verdict.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Verified => "VERIFIED",
            Outcome::Failed { .. } => "FAILED",
            Outcome::Unknown { .. } => "UNKNOWN",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Verified => write!(f, "VERIFIED"),
            Outcome::Failed {
                detail,
                counterexample,
            } => {
                write!(f, "FAILED")?;
                if let Some(detail) = detail {
                    write!(f, "\n  {}", detail)?;
                }
                if let Some(ce) = counterexample {
                    write!(f, "\n  counterexample: {}", ce)?;
                }
                Ok(())
            }
            Outcome::Unknown { reason } => write!(f, "UNKNOWN ({})", reason),
        }
    }
}

/// One procedure's verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcedureReport {
    pub name: String,
    pub outcome: Outcome,
}

/// The verdicts of a whole verification run.
///
/// Procedures appear in verification order. `program` is `None` when a
/// procedure failure halted the run before the top-level VC was emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub procedures: Vec<ProcedureReport>,
    pub program: Option<Outcome>,
}

impl Report {
    /// True iff every procedure and the top-level program verified.
    ///
    /// Drivers derive their exit code from this.
    pub fn all_verified(&self) -> bool {
        self.procedures.iter().all(|p| p.outcome.is_verified())
            && matches!(self.program, Some(Outcome::Verified))
    }

    /// The report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in &self.procedures {
            writeln!(f, "procedure {}: {}", p.name, p.outcome)?;
        }
        match &self.program {
            Some(outcome) => writeln!(f, "main: {}", outcome),
            None => writeln!(f, "main: skipped (a procedure did not verify)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_the_output_contract() {
        assert_eq!(Outcome::Verified.to_string(), "VERIFIED");
        let unknown = Outcome::Unknown {
            reason: "timeout".into(),
        };
        assert_eq!(unknown.to_string(), "UNKNOWN (timeout)");
    }

    #[test]
    fn failed_shows_detail_and_counterexample() {
        let outcome = Outcome::failed(
            Some("return r outside a procedure body".into()),
            Some(CounterExample {
                assignments: vec![("x".into(), "3".into()), ("y".into(), "0".into())],
                model: String::new(),
            }),
        );
        let text = outcome.to_string();
        assert!(text.starts_with("FAILED"));
        assert!(text.contains("return r outside a procedure body"));
        assert!(text.contains("x = 3, y = 0"));
    }

    #[test]
    fn all_verified_requires_the_program_vc() {
        let mut report = Report::default();
        report.procedures.push(ProcedureReport {
            name: "bump".into(),
            outcome: Outcome::Verified,
        });
        assert!(!report.all_verified()); // program VC missing
        report.program = Some(Outcome::Verified);
        assert!(report.all_verified());
    }

    #[test]
    fn report_serializes_to_json() {
        let report = Report {
            procedures: vec![ProcedureReport {
                name: "bump".into(),
                outcome: Outcome::Verified,
            }],
            program: Some(Outcome::Unknown {
                reason: "canceled".into(),
            }),
        };
        let json = report.to_json().unwrap();
        assert!(json.contains("\"status\": \"Verified\""));
        assert!(json.contains("canceled"));
    }
}
