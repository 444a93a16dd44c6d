// Model browsing: fetch the listing and resolve the name the user asks for.

use crate::api::{IdeApi, Model};
use crate::error::{Error, Result};
use crate::token::Token;
use crate::ui::Terminal;

pub fn list_models<A, T>(api: &A, token: &Token, term: &T) -> Result<Vec<Model>>
where
    A: IdeApi + ?Sized,
    T: Terminal + ?Sized,
{
    let _busy = term.busy("Fetching models...");
    api.models(token)
}

/// Exact, case-sensitive lookup by name. The first match wins.
pub fn select_model<'a>(models: &'a [Model], name: &str) -> Result<&'a Model> {
    models
        .iter()
        .find(|m| m.name == name)
        .ok_or_else(|| Error::NotFound(name.to_string()))
}

/// Resolve the model to download. Without a preselected name, print every
/// model name and ask for one.
pub fn choose_model<'a, T>(term: &mut T, models: &'a [Model], preselected: Option<&str>) -> Result<&'a Model>
where
    T: Terminal + ?Sized,
{
    let name = match preselected {
        Some(name) => name.to_string(),
        None => {
            term.say("Models:")?;
            for model in models {
                term.say(&format!("\t{}", model.name))?;
            }
            term.read_line("Enter model name")?
        }
    };
    select_model(models, &name)
}
