// Command-line configuration. Every connection setting can also come from
// the environment so scripted runs do not need flags.

use std::path::PathBuf;

use clap::Parser;

use crate::api::{DEFAULT_HOST, DEFAULT_PORT};
use crate::app::Options;
use crate::token::DEFAULT_TOKEN_FILE;

#[derive(Parser, Debug)]
#[command(name = "impfetch", version, about = "Download agent and device code of an Imp IDE model")]
pub struct Cli {
    /// IDE API host
    #[arg(long, env = "IMP_API_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// IDE API port (plain HTTP)
    #[arg(long, env = "IMP_API_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// File caching the session token between runs
    #[arg(long, env = "IMP_TOKEN_FILE", default_value = DEFAULT_TOKEN_FILE)]
    pub token_file: PathBuf,

    /// Directory that receives agent.nut and device.nut
    #[arg(long, env = "IMP_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Model to download instead of prompting for one
    #[arg(long)]
    pub model: Option<String>,

    /// Log requests and token handling to stderr
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    pub fn options(&self) -> Options {
        Options {
            out_dir: self.out_dir.clone(),
            model: self.model.clone(),
        }
    }

    /// Default log filter; `RUST_LOG` still takes precedence.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}
