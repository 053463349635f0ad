//! `instamojo auth`: log in and revoke tokens.

use std::io::{self, IsTerminal};

use anyhow::{bail, Context, Result};
use log::debug;

use crate::api::types::AuthResponse;
use crate::api::ApiClient;
use crate::cli::args::AuthAction;
use crate::cli::context::RunContext;
use crate::output::format::{notice, success};
use crate::output::json::print_response;

pub const PASSWORD_ENV: &str = "INSTAMOJO_PASSWORD";

pub fn run(client: &mut ApiClient, action: &AuthAction, ctx: &RunContext) -> Result<()> {
    match action {
        AuthAction::Login { username } => login(client, username, ctx),
        AuthAction::Revoke => revoke(client, ctx),
    }
}

fn login(client: &mut ApiClient, username: &str, ctx: &RunContext) -> Result<()> {
    let password = read_password()?;

    let response = client.authenticate(username, &password)?;
    print_response(&response, ctx.output_mode);

    // Saved even on failure so the file always mirrors the session
    client.save_token(&ctx.settings.token_file)?;

    if AuthResponse::issued_token(&response).is_some() {
        success(&format!("Token saved to {}", ctx.settings.token_file.display()));
    } else {
        notice("Authentication did not return a new token.");
    }
    Ok(())
}

fn revoke(client: &mut ApiClient, ctx: &RunContext) -> Result<()> {
    let response = client.revoke_token()?;
    print_response(&response, ctx.output_mode);

    client.save_token(&ctx.settings.token_file)?;
    if client.token().is_none() {
        success("Token revoked.");
    }
    Ok(())
}

/// Read the password from `INSTAMOJO_PASSWORD`, or prompt on a terminal.
fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        debug!("Using password from {}", PASSWORD_ENV);
        return Ok(password);
    }

    if !io::stdin().is_terminal() {
        bail!(
            "No password available: set {} or run from an interactive terminal",
            PASSWORD_ENV
        );
    }

    dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .context("Failed to read password")
}
