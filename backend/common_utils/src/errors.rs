//! Shared error and result types.

/// Workspace-wide alias for results carrying an [`error_stack::Report`].
pub type CustomResult<T, E> = error_stack::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ParsingError {
    #[error("Failed to parse struct: {0}")]
    StructParseFailure(&'static str),
    #[error("Integer overflow while converting an amount")]
    IntegerOverflow,
}
