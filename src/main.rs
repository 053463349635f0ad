mod api;
mod cli;
mod commands;
mod config;
mod output;
mod platform;

use anyhow::{bail, Result};
use clap::Parser;

use api::ApiClient;
use cli::args::{Cli, Commands};
use cli::context::RunContext;
use output::format::notice;

fn main() -> Result<()> {
    setup_broken_pipe_handling();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = RunContext::from_args(&cli)?;
    let mut client = ApiClient::new(ctx.settings.client.clone())?;

    match cli.token.as_deref() {
        Some(token) if token.is_empty() => bail!("Provided --token value is empty"),
        Some(token) => client.set_token(token),
        None => {
            if client.load_token(&ctx.settings.token_file)? {
                notice("API token loaded from file.");
            }
        }
    }

    match &cli.command {
        Commands::Debug => commands::debug::run(&client, &ctx)?,
        Commands::Auth { action } => commands::auth::run(&mut client, action, &ctx)?,
        Commands::Offer { action } => commands::offer::run(&client, action, &ctx)?,
    }

    Ok(())
}

const LOG_ENV: &str = "INSTAMOJO_LOG";

/// Route `log` output to stderr.
///
/// `INSTAMOJO_LOG` takes a full filter string (e.g. `instamojo::api=trace`).
/// Without it, `--verbose` shows this crate's debug output and everything
/// else stays at warnings.
fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.format_module_path(false).format_target(true);

    match std::env::var(LOG_ENV) {
        Ok(filter) => {
            builder.parse_filters(&filter);
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Warn);
            if verbose {
                builder.filter_module(env!("CARGO_CRATE_NAME"), log::LevelFilter::Debug);
            }
        }
    }

    builder.init();
}

/// Whether a panic payload is std's "failed printing to stdout" (closed pipe).
fn is_closed_stdout(payload: &(dyn std::any::Any + Send)) -> bool {
    let message = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied());
    message.is_some_and(|m| m.contains("failed printing to stdout"))
}

/// Exit quietly when stdout is closed early (e.g. `instamojo offer list | head -1`).
fn setup_broken_pipe_handling() {
    // Restore SIGPIPE's default action (SIG_DFL) so a closed pipe ends the process
    #[cfg(unix)]
    unsafe {
        unsafe extern "C" {
            fn signal(sig: i32, handler: usize) -> usize;
        }
        const SIGPIPE: i32 = 13;
        signal(SIGPIPE, 0);
    }

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if is_closed_stdout(info.payload()) {
            std::process::exit(0);
        }
        default_hook(info);
    }));
}
