// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, build the API client and the terminal,
//   and hand them to `app::run`.
// - Any error ends the process with `Error: ...` and exit status 1.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use impfetch::api::HttpIde;
use impfetch::app;
use impfetch::config::Cli;
use impfetch::token::TokenStore;
use impfetch::ui::{self, DialoguerTerminal, LineTerminal};

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level())).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::print_error(&err);
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let api = HttpIde::for_host(&cli.host, cli.port).context("failed to build HTTP client")?;
    let store = TokenStore::new(&cli.token_file);
    let options = cli.options();
    log::debug!("using {} with token file {}", api.base_url(), store.path().display());

    // The terminal lives for this whole call and is dropped on every path,
    // including errors.
    let written = if io::stdin().is_terminal() {
        let mut term = DialoguerTerminal::new();
        app::run(&api, &store, &mut term, &options)?
    } else {
        let stdin = io::stdin();
        let mut term = LineTerminal::new(stdin.lock(), io::stdout());
        app::run(&api, &store, &mut term, &options)?
    };

    log::debug!("wrote {} file(s)", written.len());
    Ok(())
}
