/// Failure raised by a lookup source while resolving prerequisites.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal error: {0}")]
    Internal(String),
}
