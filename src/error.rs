// Error types shared by every module of the library.
//
// The binary turns any of these into an `Error:` line and exit status 1.
// Messages leave out their `source`; the binary prints the whole chain.
// The only error the library recovers from itself is a rejected cached
// token, see `auth`.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The API could not be reached or the connection broke mid-response.
    #[error("could not reach the IDE API")]
    Network(#[from] reqwest::Error),

    /// The server refused our token or the login response was unusable.
    #[error("{0}")]
    Auth(String),

    /// No model in the listing carries the requested name.
    #[error("no model has the name \"{0}\"")]
    NotFound(String),

    #[error("{}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the interactive console failed.
    #[error("console I/O failed")]
    Console(#[from] std::io::Error),

    #[error("unexpected response from {path}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} returned {status}: {body}")]
    Api {
        path: String,
        status: StatusCode,
        body: String,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
