use framebind_api_core::{EventKind, RequestError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BindError {
    #[error("source view '{anchor}' not found")]
    SourceNotFound { anchor: String },
    #[error("binding of kind '{0}' requires an anchor")]
    MissingAnchor(EventKind),
    #[error("no handler registered for kind '{0}'")]
    UnsupportedKind(EventKind),
    #[error("binding limit of {0} reached")]
    CapacityExceeded(usize),
    #[error("malformed token '{0}'")]
    BadToken(String),
    #[error(transparent)]
    Request(#[from] RequestError),
}
