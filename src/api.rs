// API client module: a small blocking HTTP transport plus the handful of
// Imp IDE endpoints this tool needs. Requests go out strictly one at a
// time; there is no retry, pooling policy or pagination.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::token::{Credentials, Token};

pub const DEFAULT_HOST: &str = "api.electricimp.com";
pub const DEFAULT_PORT: u16 = 80;

const LOGIN_PATH: &str = "/account/login";
const IDE_PREFIX: &str = "/ide/v3/";

/// Status and raw body of one HTTP exchange. The body is only parsed
/// once the caller has looked at the status.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub text: String,
}

impl Response {
    /// Parse the body as JSON. An empty body parses to `Value::Null`.
    pub fn json(&self, path: &str) -> Result<Value> {
        if self.text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.text).map_err(|source| Error::Decode {
            path: path.to_string(),
            source,
        })
    }
}

/// Issues single HTTP requests against one fixed base URL.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(HttpTransport { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request and collect the response body.
    ///
    /// Transport failures surface as [`Error::Network`]. The status code is
    /// returned as-is, callers decide what a non-2xx means and whether the
    /// body should be JSON.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<&Value>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send()?;
        let status = res.status();
        log::debug!("{} {} -> {}", method, path, status);

        let text = res.text()?;
        Ok(Response { status, text })
    }
}

/// One remote project as returned by the model listing.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Model {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

/// Body of a successful session check.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct SessionInfo {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SideCode {
    #[serde(default)]
    pub code: Option<String>,
}

/// Source code of a model. The device side is called `imp` by the IDE.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CodePayload {
    #[serde(default)]
    pub agent: Option<SideCode>,
    #[serde(default, rename = "imp", alias = "device")]
    pub device: Option<SideCode>,
}

impl CodePayload {
    pub fn agent_code(&self) -> Option<&str> {
        non_empty(&self.agent)
    }

    pub fn device_code(&self) -> Option<&str> {
        non_empty(&self.device)
    }
}

fn non_empty(side: &Option<SideCode>) -> Option<&str> {
    side.as_ref()
        .and_then(|s| s.code.as_deref())
        .filter(|code| !code.is_empty())
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Outcome of checking a cached token against the session endpoint.
#[derive(Debug)]
pub enum SessionCheck {
    Valid(SessionInfo),
    Rejected(StatusCode),
}

/// The IDE operations the workflow depends on. `HttpIde` is the real
/// implementation; tests substitute in-memory fakes.
pub trait IdeApi {
    /// Submit credentials and return the raw login response body, whatever
    /// its status or format.
    fn login(&self, credentials: &Credentials) -> Result<String>;
    fn session(&self, token: &Token) -> Result<SessionCheck>;
    fn models(&self, token: &Token) -> Result<Vec<Model>>;
    fn code(&self, token: &Token, model_id: &str) -> Result<CodePayload>;
}

/// Imp IDE REST client over [`HttpTransport`].
#[derive(Clone)]
pub struct HttpIde {
    transport: HttpTransport,
}

impl HttpIde {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(HttpIde {
            transport: HttpTransport::new(base_url)?,
        })
    }

    /// Plain HTTP on the given host and port.
    pub fn for_host(host: &str, port: u16) -> Result<Self> {
        Self::new(format!("http://{}:{}", host, port))
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Authenticated GET below `/ide/v3/`.
    fn ide_get(&self, token: &Token, path: &str) -> Result<(String, Response)> {
        let full_path = format!("{}{}", IDE_PREFIX, path);
        let cookie = HeaderValue::from_str(&token.cookie())
            .map_err(|_| Error::Auth("session token contains characters not allowed in a cookie".into()))?;
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, cookie);
        let res = self.transport.request(Method::GET, &full_path, headers, None)?;
        Ok((full_path, res))
    }

    /// Like `ide_get` but insists on a 2xx status and decodes the body.
    fn ide_get_json<T: DeserializeOwned>(&self, token: &Token, path: &str) -> Result<T> {
        let (full_path, res) = self.ide_get(token, path)?;
        match res.status {
            s if s.is_success() => {
                let body = res.json(&full_path)?;
                serde_json::from_value(body).map_err(|source| Error::Decode {
                    path: full_path,
                    source,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Auth(format!(
                "the IDE rejected the session token ({})",
                res.status
            ))),
            status => Err(Error::Api {
                path: full_path,
                status,
                body: res.text,
            }),
        }
    }
}

impl IdeApi for HttpIde {
    fn login(&self, credentials: &Credentials) -> Result<String> {
        let body = serde_json::to_value(credentials).map_err(|source| Error::Decode {
            path: LOGIN_PATH.to_string(),
            source,
        })?;
        let res = self
            .transport
            .request(Method::POST, LOGIN_PATH, HeaderMap::new(), Some(&body))?;
        Ok(res.text)
    }

    fn session(&self, token: &Token) -> Result<SessionCheck> {
        let (path, res) = self.ide_get(token, "session")?;
        if res.status == StatusCode::OK {
            // Any 200 validates the token; the username is a courtesy.
            let info = res
                .json(&path)
                .ok()
                .and_then(|body| serde_json::from_value(body).ok())
                .unwrap_or_default();
            Ok(SessionCheck::Valid(info))
        } else {
            Ok(SessionCheck::Rejected(res.status))
        }
    }

    fn models(&self, token: &Token) -> Result<Vec<Model>> {
        self.ide_get_json(token, "models")
    }

    fn code(&self, token: &Token, model_id: &str) -> Result<CodePayload> {
        self.ide_get_json(token, &format!("models/{}/code", model_id))
    }
}
