// Code download: fetch a model's source and write each side to its own file.

use std::path::{Path, PathBuf};

use crate::api::{CodePayload, IdeApi, Model};
use crate::error::{Error, Result};
use crate::token::Token;
use crate::ui::Terminal;

/// The two independently optional halves of a model's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Agent,
    Device,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Agent, Side::Device];

    pub fn label(self) -> &'static str {
        match self {
            Side::Agent => "agent",
            Side::Device => "device",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Side::Agent => "agent.nut",
            Side::Device => "device.nut",
        }
    }

    pub fn code(self, payload: &CodePayload) -> Option<&str> {
        match self {
            Side::Agent => payload.agent_code(),
            Side::Device => payload.device_code(),
        }
    }
}

pub fn fetch_code<A, T>(api: &A, token: &Token, model: &Model, term: &T) -> Result<CodePayload>
where
    A: IdeApi + ?Sized,
    T: Terminal + ?Sized,
{
    let _busy = term.busy(&format!("Downloading {}...", model.name));
    api.code(token, &model.id)
}

/// Write one side's code into `out_dir`, overwriting any earlier file.
/// Returns the written path, or `None` after telling the user the model has
/// no code for that side.
pub fn persist<T>(
    term: &mut T,
    out_dir: &Path,
    model_name: &str,
    payload: &CodePayload,
    side: Side,
) -> Result<Option<PathBuf>>
where
    T: Terminal + ?Sized,
{
    let Some(code) = side.code(payload) else {
        term.info(&format!("\"{}\" has no {} code", model_name, side.label()))?;
        return Ok(None);
    };

    std::fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;
    let path = output_path(out_dir, side);
    std::fs::write(&path, code).map_err(|e| Error::io(&path, e))?;
    term.info(&format!("saved {}", path.display()))?;
    Ok(Some(path))
}

/// `agent.nut` rather than `./agent.nut` when writing to the working directory.
fn output_path(out_dir: &Path, side: Side) -> PathBuf {
    if out_dir == Path::new(".") {
        PathBuf::from(side.file_name())
    } else {
        out_dir.join(side.file_name())
    }
}
