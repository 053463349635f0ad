//! `instamojo offer`: offer CRUD and file uploads.

use std::path::Path;

use anyhow::{Context, Result};

use crate::api::{ApiClient, OfferFields};
use crate::cli::args::{OfferAction, OfferArgs};
use crate::cli::context::RunContext;
use crate::output::format::{notice, OutputMode};
use crate::output::json::print_response;
use crate::output::progress::Activity;

pub fn run(client: &ApiClient, action: &OfferAction, ctx: &RunContext) -> Result<()> {
    let response = match action {
        OfferAction::List => client.list_offers()?,
        OfferAction::Show { slug } => client.get_offer(slug)?,
        OfferAction::Delete { slug } => client.delete_offer(slug)?,
        OfferAction::UploadUrl => client.get_file_upload_url()?,
        OfferAction::Create { fields, file } => {
            return create(client, fields, file.as_deref(), ctx);
        }
    };

    print_response(&response, ctx.output_mode);
    Ok(())
}

fn create(
    client: &ApiClient,
    args: &OfferArgs,
    file: Option<&Path>,
    ctx: &RunContext,
) -> Result<()> {
    // Don't upload a file for an offer that can't be created
    client.require_token()?;
    let mut fields = OfferFields::from(args.clone());

    if let Some(path) = file {
        fields.file_upload_json = Some(upload(client, path, ctx.output_mode)?);
    }

    let response = client.create_offer(fields.into_form())?;
    print_response(&response, ctx.output_mode);
    Ok(())
}

/// Upload `path` through the offer upload flow and return the file reference.
fn upload(client: &ApiClient, path: &Path, mode: OutputMode) -> Result<String> {
    let activity = Activity::start(&format!("Uploading {}...", path.display()));
    let result = client.upload_offer_file(path);
    activity.finish();

    let reference = result.with_context(|| format!("Failed to upload {}", path.display()))?;
    if mode == OutputMode::Tty {
        notice(&format!("Uploaded {}: {}", path.display(), reference.trim()));
    }
    Ok(reference)
}
