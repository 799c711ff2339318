use core_types::ThingKind;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CaseError {
    #[error("case {0:?} is disabled")]
    Disabled(String),
    #[error("case {case:?} does not apply to {kind:?} things")]
    NotApplicable { case: String, kind: ThingKind },
    #[error("no case named {0:?}")]
    UnknownCase(String),
    #[error("case {0:?} is already registered")]
    DuplicateCase(String),
    #[error("case {0:?} may appear only once in an expression")]
    DuplicateUnique(String),
    #[error("invalid configuration for case {case:?}: {config}")]
    InvalidConfig { case: String, config: String },
    #[error("case {case:?} failed: {message}")]
    Evaluation { case: String, message: String },
}

impl CaseError {
    pub fn evaluation(case: &str, message: impl Into<String>) -> Self {
        Self::Evaluation {
            case: case.to_string(),
            message: message.into(),
        }
    }
}
