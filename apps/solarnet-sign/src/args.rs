//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Compute the SNWS2 `Authorization` header for a SolarNetwork API request.
///
/// The token and secret are read from `SOLARNETWORK_TOKEN` and
/// `SOLARNETWORK_SECRET` unless given as options.
#[derive(Debug, Parser)]
#[command(name = "solarnet-sign", version)]
pub struct Args {
    /// Full request URL, or a path resolved against the configured environment.
    pub url: String,

    /// HTTP method.
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Security token identifier.
    #[arg(long)]
    pub token: Option<String>,

    /// Security token secret.
    #[arg(long, conflicts_with = "signing_key")]
    pub secret: Option<String>,

    /// Hex-encoded signing key to use instead of the secret.
    #[arg(long)]
    pub signing_key: Option<String>,

    /// Request date as RFC 3339 (defaults to now).
    #[arg(long)]
    pub date: Option<String>,

    /// `Content-Type` of the request body.
    #[arg(long)]
    pub content_type: Option<String>,

    /// Request body.
    #[arg(short = 'd', long, conflicts_with = "data_file")]
    pub data: Option<String>,

    /// File holding the request body.
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Extra header as `Name: value`; may be repeated.
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Extra header names to sign; may be repeated.
    #[arg(long = "sign-header")]
    pub signed_headers: Vec<String>,

    /// Sign `X-SN-Date` instead of `Date`.
    #[arg(long)]
    pub sn_date: bool,

    /// Keep the environment port in `Host` (for requests through a port-forwarding proxy).
    #[arg(long)]
    pub force_host_port: bool,

    /// Do not sign the URL query parameters.
    #[arg(long)]
    pub no_query: bool,

    /// Also print the canonical request and string to sign.
    #[arg(long)]
    pub verbose: bool,

    /// Print the headers as a JSON object.
    #[arg(long)]
    pub json: bool,
}
