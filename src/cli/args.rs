use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::api::OfferFields;

#[derive(Parser, Debug)]
#[command(
    name = "instamojo",
    version = env!("INSTAMOJO_VERSION"),
    about = "Manage Instamojo offers from the command line"
)]
pub struct Cli {
    /// Print API responses as compact JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored status messages
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose output for debugging API calls
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// API base URL [env: INSTAMOJO_ENDPOINT]
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Application id sent with every request [env: INSTAMOJO_APP_ID]
    #[arg(long, global = true)]
    pub app_id: Option<String>,

    /// Use a specific API token instead of the saved one
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Use a specific token file instead of the default
    #[arg(long, global = true)]
    pub token_file: Option<PathBuf>,

    /// Use a specific config file instead of the default
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Call the API debug endpoint
    Debug,

    /// Log in or revoke the saved token
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// List, show, create and delete offers
    Offer {
        #[command(subcommand)]
        action: OfferAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Authenticate and save the issued token [password from INSTAMOJO_PASSWORD or prompt]
    Login {
        /// Account username
        username: String,
    },

    /// Revoke the saved token
    #[command(visible_alias = "delete")]
    Revoke,
}

#[derive(Subcommand, Debug)]
pub enum OfferAction {
    /// List offers
    #[command(visible_alias = "ls")]
    List,

    /// Show offer details
    Show {
        /// Offer slug
        slug: String,
    },

    /// Delete an offer
    Delete {
        /// Offer slug
        slug: String,
    },

    /// Create an offer
    Create {
        #[command(flatten)]
        fields: OfferArgs,

        /// Upload this file first and attach it as the offer's file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Get a URL to upload an offer file to
    UploadUrl,
}

#[derive(Args, Debug, Clone)]
pub struct OfferArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Price in INR
    #[arg(long)]
    pub inr: Option<String>,

    /// Price in USD
    #[arg(long)]
    pub usd: Option<String>,

    #[arg(long)]
    pub quantity: Option<String>,

    #[arg(long)]
    pub start_date: Option<String>,

    #[arg(long)]
    pub end_date: Option<String>,

    #[arg(long)]
    pub venue: Option<String>,

    #[arg(long)]
    pub timezone: Option<String>,

    #[arg(long)]
    pub redirect_url: Option<String>,

    #[arg(long)]
    pub note: Option<String>,

    /// File reference returned by a previous upload
    #[arg(long, conflicts_with = "file")]
    pub file_upload_json: Option<String>,

    /// Cover image reference returned by a previous upload
    #[arg(long)]
    pub cover_image_json: Option<String>,
}

impl From<OfferArgs> for OfferFields {
    fn from(args: OfferArgs) -> Self {
        OfferFields {
            title: args.title,
            description: args.description,
            base_inr: args.inr,
            base_usd: args.usd,
            quantity: args.quantity,
            start_date: args.start_date,
            end_date: args.end_date,
            venue: args.venue,
            timezone: args.timezone,
            redirect_url: args.redirect_url,
            note: args.note,
            file_upload_json: args.file_upload_json,
            cover_image_json: args.cover_image_json,
        }
    }
}
