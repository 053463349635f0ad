use anyhow::Result;

use crate::api::ApiClient;
use crate::cli::context::RunContext;
use crate::output::json::print_response;

/// Run debug command
pub fn run(client: &ApiClient, ctx: &RunContext) -> Result<()> {
    let response = client.debug()?;
    print_response(&response, ctx.output_mode);
    Ok(())
}
