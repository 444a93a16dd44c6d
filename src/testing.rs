// In-memory IDE and terminal doubles for unit tests.

use std::cell::RefCell;
use std::io::Cursor;

use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::api::{CodePayload, IdeApi, Model, SessionCheck, SessionInfo, SideCode};
use crate::error::{Error, Result};
use crate::token::{Credentials, Token};
use crate::ui::LineTerminal;

pub(crate) type TestTerminal = LineTerminal<Cursor<Vec<u8>>, Vec<u8>>;

pub(crate) fn terminal(input: &str) -> TestTerminal {
    LineTerminal::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

pub(crate) fn output(term: TestTerminal) -> String {
    String::from_utf8(term.into_output()).unwrap()
}

pub(crate) fn model(id: &str, name: &str) -> Model {
    Model {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub(crate) fn code(agent: Option<&str>, device: Option<&str>) -> CodePayload {
    let side = |code: Option<&str>| {
        Some(SideCode {
            code: code.map(str::to_string),
        })
    };
    CodePayload {
        agent: side(agent),
        device: side(device),
    }
}

/// Scripted IDE. `session` of `None` simulates a transport failure.
/// Every call is recorded in `calls`.
pub(crate) struct FakeIde {
    pub session: Option<StatusCode>,
    pub login_body: String,
    pub models: Vec<Model>,
    pub code: CodePayload,
    pub calls: RefCell<Vec<String>>,
}

impl Default for FakeIde {
    fn default() -> Self {
        FakeIde {
            session: Some(StatusCode::OK),
            login_body: json!({ "token": "imp.token=ABC123" }).to_string(),
            models: vec![model("1", "Foo"), model("2", "Bar")],
            code: code(Some("a"), Some("d")),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl FakeIde {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl IdeApi for FakeIde {
    fn login(&self, credentials: &Credentials) -> Result<String> {
        self.record(format!("login {} {}", credentials.email, credentials.password));
        Ok(self.login_body.clone())
    }

    fn session(&self, token: &Token) -> Result<SessionCheck> {
        self.record(format!("session {}", token.as_str()));
        match self.session {
            Some(StatusCode::OK) => Ok(SessionCheck::Valid(SessionInfo {
                username: Some("tester".into()),
            })),
            Some(status) => Ok(SessionCheck::Rejected(status)),
            None => Err(Error::Decode {
                path: "/ide/v3/session".into(),
                source: serde_json::from_str::<Value>("<html>").unwrap_err(),
            }),
        }
    }

    fn models(&self, token: &Token) -> Result<Vec<Model>> {
        self.record(format!("models {}", token.as_str()));
        Ok(self.models.clone())
    }

    fn code(&self, token: &Token, model_id: &str) -> Result<CodePayload> {
        self.record(format!("code {} models/{}/code", token.as_str(), model_id));
        Ok(self.code.clone())
    }
}
