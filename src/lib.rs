// Library root
// -----------
// This crate exposes the building blocks of the `impfetch` CLI, which logs
// into the Imp IDE, lists the account's models and downloads the agent and
// device code of one of them. The binary (`main.rs`) only parses flags,
// sets up logging and picks a terminal.
//
// Module responsibilities:
// - `api`: HTTP transport and the IDE endpoints (login, session, models,
//   code) plus their wire types.
// - `token`: the session token, the cookie parser and the token file.
// - `auth`: the login flow with cached-token reuse.
// - `models` / `code`: choosing a model and writing its code to disk.
// - `ui`: terminal prompts and notices, interactive or line-based.
// - `app`: chains the steps above into one run.
// - `config`: command-line flags.
pub mod api;
pub mod app;
pub mod auth;
pub mod code;
pub mod config;
pub mod error;
pub mod models;
pub mod token;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
