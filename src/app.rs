// The whole download workflow, one step after another:
// authenticate, pick a model, fetch its code, write the files.

use std::path::PathBuf;

use crate::api::IdeApi;
use crate::auth::authenticate;
use crate::code::{fetch_code, persist, Side};
use crate::error::Result;
use crate::models::{choose_model, list_models};
use crate::token::TokenStore;
use crate::ui::Terminal;

/// Per-run choices that are not part of the API connection.
#[derive(Debug, Clone)]
pub struct Options {
    /// Directory receiving `agent.nut` and `device.nut`.
    pub out_dir: PathBuf,
    /// Model name to download; prompts for one when `None`.
    pub model: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            out_dir: PathBuf::from("."),
            model: None,
        }
    }
}

/// Run the workflow and return the paths of the files written.
pub fn run<A, T>(api: &A, store: &TokenStore, term: &mut T, options: &Options) -> Result<Vec<PathBuf>>
where
    A: IdeApi + ?Sized,
    T: Terminal + ?Sized,
{
    let token = authenticate(api, store, term)?;
    let models = list_models(api, &token, &*term)?;
    let model = choose_model(term, &models, options.model.as_deref())?;
    let payload = fetch_code(api, &token, model, &*term)?;

    let mut written = Vec::new();
    for side in Side::ALL {
        if let Some(path) = persist(term, &options.out_dir, &model.name, &payload, side)? {
            written.push(path);
        }
    }
    Ok(written)
}
