use faq_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("knowledge base {path}: {message}")]
    Source { path: String, message: String },

    #[error("surface error: {0}")]
    Surface(String),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("no visible item matches '{0}'")]
    ItemNotFound(String),
}
