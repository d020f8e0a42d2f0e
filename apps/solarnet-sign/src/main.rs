//! SolarNetwork request signer.
//!
//! Prints the headers needed to send a SNWS2-authenticated request, so they
//! can be pasted into `curl` or another HTTP client.
//!
//! # Usage
//!
//! ```text
//! SOLARNETWORK_TOKEN=abc SOLARNETWORK_SECRET=xyz \
//!     solarnet-sign https://data.solarnetwork.net/solarquery/api/v1/sec/nodes
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SOLARNETWORK_HOST` | `data.solarnetwork.net` | Host for path-only URLs |
//! | `SOLARNETWORK_PORT` | *(protocol default)* | Port for path-only URLs |
//! | `SOLARNETWORK_PROTOCOL` | `https` | `http` or `https` |
//! | `SOLARNETWORK_TOKEN` | *(unset)* | Security token identifier |
//! | `SOLARNETWORK_SECRET` | *(unset)* | Security token secret |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod args;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Parser;
use http::HeaderMap;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use solarnet_auth::date::parse_http_date;
use solarnet_auth::{AuthorizationBuilder, SigningKey};
use solarnet_core::{HttpMethod, SolarNetConfig};

use crate::args::Args;

/// Initialize the tracing subscriber on stderr, keeping stdout for the headers.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Parse a `--date` value given as RFC 3339 or as an HTTP-date.
fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    parse_http_date(value).with_context(|| format!("invalid date: {value}"))
}

/// Split a `Name: value` header argument.
fn parse_header_arg(value: &str) -> Result<(&str, &str)> {
    let Some((name, header_value)) = value.split_once(':') else {
        bail!("header must be given as `Name: value`: {value}");
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("header name is empty: {value}");
    }
    Ok((name, header_value.trim()))
}

/// Turn a path-only URL into an absolute one against the configured environment.
fn absolute_url(url: &str, config: &SolarNetConfig) -> String {
    if url.starts_with('/') {
        format!("{}{url}", config.environment().base_url())
    } else {
        url.to_owned()
    }
}

/// Read the request body from `--data` or `--data-file`.
fn request_body(args: &Args) -> Result<Option<Vec<u8>>> {
    if let Some(data) = &args.data {
        return Ok(Some(data.clone().into_bytes()));
    }
    match &args.data_file {
        Some(path) => std::fs::read(path)
            .map(Some)
            .with_context(|| format!("failed to read body from {}", path.display())),
        None => Ok(None),
    }
}

/// Configure a builder for the request described by `args`.
fn configure(args: &Args, config: &SolarNetConfig) -> Result<AuthorizationBuilder> {
    let token = args
        .token
        .clone()
        .or_else(|| config.token.clone())
        .context("no token given: use --token or SOLARNETWORK_TOKEN")?;

    let mut builder = AuthorizationBuilder::with_environment(token, config.environment());
    builder.force_host_port(args.force_host_port);

    let method: HttpMethod = args.method.parse()?;
    builder.method(method);
    builder.url(&absolute_url(&args.url, config), !args.no_query)?;

    if let Some(date) = &args.date {
        builder.date(parse_date(date)?);
    }
    if let Some(content_type) = &args.content_type {
        builder.content_type(content_type.as_str());
    }
    for header in &args.headers {
        let (name, value) = parse_header_arg(header)?;
        builder.header(name, value);
    }
    if let Some(body) = request_body(args)? {
        builder.compute_content_digest(&body);
    }
    if !args.signed_headers.is_empty() {
        builder.signed_http_headers(Some(args.signed_headers.clone()));
    }
    builder.use_sn_date(args.sn_date);

    Ok(builder)
}

/// Sign the request and return the headers to send with it.
fn sign(args: &Args, config: &SolarNetConfig) -> Result<HeaderMap> {
    let builder = configure(args, config)?;

    let authorization = if let Some(key) = &args.signing_key {
        builder.build_with_key(&SigningKey::from_hex(key)?)
    } else {
        let secret = args
            .secret
            .as_deref()
            .or(config.secret.as_deref())
            .context("no secret given: use --secret, --signing-key, or SOLARNETWORK_SECRET")?;
        builder.build(secret)
    };

    if args.verbose {
        eprintln!("--- canonical request ---");
        eprintln!("{}", builder.build_canonical_request_data());
        eprintln!("--- string to sign ---");
        eprintln!("{}", builder.build_string_to_sign());
    }

    let mut headers = HeaderMap::new();
    builder.apply_to_headers(&mut headers, &authorization)?;
    info!(
        method = %builder.request_method(),
        path = builder.request_path(),
        signed_headers = ?builder.canonical_header_names(),
        "Signed request"
    );
    Ok(headers)
}

/// Render headers as `Name: value` lines.
fn render_lines(headers: &HeaderMap) -> Result<String> {
    let mut out = String::new();
    for (name, value) in headers {
        let value = value
            .to_str()
            .with_context(|| format!("non-ASCII value for header {name}"))?;
        out.push_str(name.as_str());
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    Ok(out)
}

/// Render headers as a JSON object; repeated headers become arrays.
fn render_json(headers: &HeaderMap) -> Result<String> {
    let mut object = serde_json::Map::new();
    for name in headers.keys() {
        let values = headers
            .get_all(name)
            .iter()
            .map(|v| v.to_str().map(str::to_owned))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("non-ASCII value for header {name}"))?;
        let value = match values.as_slice() {
            [single] => serde_json::Value::String(single.clone()),
            _ => serde_json::Value::from(values),
        };
        object.insert(name.as_str().to_owned(), value);
    }
    serde_json::to_string_pretty(&object).context("failed to serialize headers")
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = SolarNetConfig::from_env().context("failed to load configuration")?;

    init_tracing(&config.log_level)?;
    debug!(?config, "Loaded configuration");

    let headers = sign(&args, &config)?;
    let output = if args.json {
        render_json(&headers)?
    } else {
        render_lines(&headers)?
    };
    print!("{output}");
    if args.json {
        println!();
    }

    Ok(())
}
