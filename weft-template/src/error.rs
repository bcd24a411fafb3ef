use thiserror::Error;
use weft_dom::IdError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("template `{0}` not found")]
    TemplateNotFound(String),

    #[error("mount target `#{0}` not found in document")]
    MountTargetNotFound(String),

    #[error("template `{0}` is defined more than once")]
    DuplicateTemplate(String),

    #[error("invalid template bundle: {0}")]
    Bundle(String),

    #[error("invalid markup in template `{name}`: {message}")]
    Markup { name: String, message: String },

    #[error("cannot allocate node identifier: {0}")]
    Identifier(#[from] IdError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
