use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("{0}")]
    Validation(String),
}

impl ModelError {
    pub fn validation(msg: &str) -> Self { Self::Validation(msg.to_string()) }
}
