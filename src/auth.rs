// Login flow: reuse the cached token when the IDE still accepts it,
// otherwise ask for credentials, exchange them for a fresh token and
// offer to cache it.

use serde_json::Value;

use crate::api::{IdeApi, SessionCheck};
use crate::error::{Error, Result};
use crate::token::{parse_token_cookie, Credentials, Token, TokenStore};
use crate::ui::Terminal;

/// Steps of the login flow. A fatal failure leaves the machine as an `Err`.
#[derive(Debug)]
enum AuthState {
    CheckingCache,
    Validating(Token),
    PromptingCredentials,
    LoggingIn(Credentials),
    Authenticated(Token),
}

/// Produce a token the IDE accepts.
///
/// A cached token rejected by the session check (or a session check that
/// fails outright) is deleted and the user is asked to log in. Any other
/// failure is returned to the caller.
pub fn authenticate<A, T>(api: &A, store: &TokenStore, term: &mut T) -> Result<Token>
where
    A: IdeApi + ?Sized,
    T: Terminal + ?Sized,
{
    let mut state = AuthState::CheckingCache;
    loop {
        log::debug!("auth state: {:?}", state);
        state = match state {
            AuthState::CheckingCache => match store.load() {
                Some(token) => AuthState::Validating(token),
                None => AuthState::PromptingCredentials,
            },
            AuthState::Validating(token) => {
                let check = {
                    let _busy = term.busy("Checking saved session...");
                    api.session(&token)
                };
                match check {
                    Ok(SessionCheck::Valid(info)) => {
                        if let Some(username) = info.username {
                            term.info(&format!("connected as {}", username))?;
                        }
                        AuthState::Authenticated(token)
                    }
                    Ok(SessionCheck::Rejected(status)) => {
                        log::debug!("session check rejected the cached token with {}", status);
                        discard_stale(store, term)?;
                        AuthState::PromptingCredentials
                    }
                    Err(err) => {
                        log::debug!("session check failed: {}", err);
                        discard_stale(store, term)?;
                        AuthState::PromptingCredentials
                    }
                }
            }
            AuthState::PromptingCredentials => AuthState::LoggingIn(prompt_credentials(term)?),
            AuthState::LoggingIn(credentials) => {
                let body = {
                    let _busy = term.busy("Logging in...");
                    api.login(&credentials)?
                };
                let token = token_from_login(&body)?;
                offer_to_save(store, term, &token)?;
                AuthState::Authenticated(token)
            }
            AuthState::Authenticated(token) => return Ok(token),
        };
    }
}

fn discard_stale<T: Terminal + ?Sized>(store: &TokenStore, term: &mut T) -> Result<()> {
    term.info("the saved imp token appears to be no longer valid")?;
    store.invalidate();
    Ok(())
}

fn prompt_credentials<T: Terminal + ?Sized>(term: &mut T) -> Result<Credentials> {
    term.say("Enter your Imp IDE email address and password")?;
    let email = term.read_line("Email")?;
    let password = term.read_line("Password")?;
    Ok(Credentials { email, password })
}

/// Pull the session token out of a raw login response body, which carries
/// it as a cookie assignment in its JSON `token` field.
///
/// Any failure is an [`Error::Auth`] quoting the whole body.
pub fn token_from_login(body: &str) -> Result<Token> {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|json| json.get("token"))
        .and_then(Value::as_str)
        .and_then(|cookie| parse_token_cookie(cookie).ok())
        .ok_or_else(|| Error::Auth(format!("login failed: {}", body)))
}

fn offer_to_save<T: Terminal + ?Sized>(store: &TokenStore, term: &mut T, token: &Token) -> Result<()> {
    let answer = term.read_line("Save token to skip login step next time? [y]")?;
    if wants_save(&answer) {
        store.save(token)?;
        term.info("saved token")?;
    }
    Ok(())
}

/// An empty answer or `y` keeps the token.
fn wants_save(answer: &str) -> bool {
    let answer = answer.trim();
    answer.is_empty() || answer.eq_ignore_ascii_case("y")
}
