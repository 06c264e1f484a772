use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0:?}")]
    DisplayError(display_interface::DisplayError),

    #[error("{0}")]
    IOError(#[from] std::io::Error),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    String(String),
}

// DisplayError doesn't implement std::error::Error, so no #[from] here
impl From<display_interface::DisplayError> for Error {
    fn from(v: display_interface::DisplayError) -> Self {
        Self::DisplayError(v)
    }
}

impl From<&str> for Error {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Error {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}
