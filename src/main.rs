mod api;
mod app;
mod cli;
mod config;
mod editor;
mod error;
mod event;
mod logging;
mod tui;
mod types;
mod ui;
mod worker;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::cli::Command;

fn main() -> Result<()> {
    let cli_opts = cli::Cli::parse();
    if let Some(command) = &cli_opts.command {
        if cli::run_offline(&cli_opts, command)? {
            return Ok(());
        }
    }

    let config = cli_opts.load_config()?;
    let client = api::HttpClient::new(&config)?;
    let log_path = logging::init(&config.log_level)?;

    if let Some(Command::Show { user, from, to }) = &cli_opts.command {
        return cli::run_show(&client, *user, from.as_deref(), to.as_deref());
    }

    let range = cli_opts.range()?;
    info!(log = %log_path.display(), base_url = %config.base_url, %range, "starting");

    let mut app = app::App::new(Arc::new(client), config.company_id, range, cli_opts.user);
    let mut terminal = tui::init()?;
    let result = event::run(&mut app, &mut terminal);

    tui::restore()?;

    result
}
