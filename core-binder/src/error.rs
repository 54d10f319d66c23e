use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BinderError {
    #[error("Invalid argument `{field}`: {message}")]
    InvalidArgument { field: String, message: String },
}

impl BinderError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        BinderError::InvalidArgument {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BinderError>;
