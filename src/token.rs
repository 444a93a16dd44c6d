// Session token handling: the token itself, the credentials exchanged for
// it, the cookie parser applied to the login response and the plaintext
// file that caches the token between runs.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

/// Cookie key the IDE uses for its session token.
pub const TOKEN_COOKIE: &str = "imp.token";

/// Default location of the cached token, relative to the working directory.
pub const DEFAULT_TOKEN_FILE: &str = "imp-token.txt";

/// Opaque session credential issued by the IDE after login. Surrounding
/// whitespace is never part of a token, so a saved token reads back exactly.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Token(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `Cookie` header value that authenticates an IDE request.
    pub fn cookie(&self) -> String {
        format!("{}={}", TOKEN_COOKIE, self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Login payload. Lives only for the duration of the login request.
#[derive(Serialize, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Extract the session token from a cookie-formatted string such as
/// `imp.token=ABC123; Path=/; HttpOnly`.
///
/// Fails with [`Error::Auth`] when the `imp.token` pair is missing or empty.
pub fn parse_token_cookie(cookie: &str) -> Result<Token> {
    cookie
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == TOKEN_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .map(Token::new)
        .ok_or_else(|| Error::Auth(format!("login response has no {} value: {}", TOKEN_COOKIE, cookie)))
}

/// Plaintext token cache. The file existing means "logged in".
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached token. A missing, unreadable or blank file all mean
    /// there is no cached session; only the unreadable case is logged.
    pub fn load(&self) -> Option<Token> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let value = content.trim();
                if value.is_empty() {
                    log::debug!("token file {} is empty", self.path.display());
                    None
                } else {
                    log::debug!("loaded cached token from {}", self.path.display());
                    Some(Token::new(value))
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("no token file at {}", self.path.display());
                None
            }
            Err(err) => {
                log::warn!("ignoring unreadable token file {}: {}", self.path.display(), err);
                None
            }
        }
    }

    /// Write the token as the whole file content, replacing any previous one.
    pub fn save(&self, token: &Token) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        std::fs::write(&self.path, token.as_str()).map_err(|e| Error::io(&self.path, e))?;
        log::debug!("saved token to {}", self.path.display());
        Ok(())
    }

    /// Remove the cached token. Best effort: failures are only logged.
    pub fn invalidate(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("removed token file {}", self.path.display()),
            Err(err) => log::debug!("could not remove token file {}: {}", self.path.display(), err),
        }
    }
}
