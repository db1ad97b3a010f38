use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("Salesforce ID cannot be empty")]
    EmptyInput,
    #[error("invalid Salesforce ID length: {actual}. Must be {expected} characters.")]
    InvalidLength { expected: &'static str, actual: usize },
}
