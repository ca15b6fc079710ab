use std::io;

use thiserror::Error;

/// Everything that can go wrong while compacting images or generating the resource table.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed, unsupported or inconsistent indexed image data
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The image has no pixel that references a palette entry
    #[error("image has no live palette entries")]
    EmptyPalette,

    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    /// The PNG encoder rejected the image
    #[error("PNG encoding failure: {0}")]
    Encoding(#[source] png::EncodingError),

    #[error("invalid resource name `{0}`")]
    InvalidResourceName(String),

    #[error("duplicate resource name `{0}`")]
    DuplicateResourceName(String),

    /// A MIME type that cannot be embedded in a quoted data URI
    #[error("invalid MIME type `{0}`")]
    InvalidMimeType(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<png::EncodingError> for Error {
    fn from(err: png::EncodingError) -> Self {
        match err {
            png::EncodingError::IoError(err) => Error::Io(err),
            err => Error::Encoding(err),
        }
    }
}

impl Error {
    pub(crate) fn invalid_image(reason: impl Into<String>) -> Self {
        Error::InvalidImage(reason.into())
    }
}
