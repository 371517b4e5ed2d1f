use clap::{Args, Parser, Subcommand};
use http::Method;
use std::path::PathBuf;

fn parse_method(raw: &str) -> Result<Method, http::method::InvalidMethod> {
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected `key=value`, got `{raw}`"))?;

    Ok((key.to_string(), value.to_string()))
}

#[derive(Args)]
pub struct SignArgs {
    /// HTTP method of the request
    #[arg(value_parser = parse_method)]
    pub method: Method,

    /// Full URL of the request
    pub url: String,

    /// JSON body of the request
    #[arg(long, short)]
    pub body: Option<String>,

    /// Unix timestamp to sign with instead of the current time
    #[arg(long, short)]
    pub timestamp: Option<u64>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// HTTP method of the request
    #[arg(value_parser = parse_method)]
    pub method: Method,

    /// Full URL of the request
    pub url: String,

    /// Value of the `x-signature` header
    #[arg(long, short)]
    pub signature: String,

    /// Value of the `x-timestamp` header
    #[arg(long, short)]
    pub timestamp: String,

    /// JSON body of the request
    #[arg(long, short)]
    pub body: Option<String>,

    /// How many seconds the timestamp may be off from the current time
    #[arg(default_value_t = 300, long)]
    pub tolerance: u64,
}

#[derive(Args)]
pub struct RequestArgs {
    /// HTTP method of the request
    #[arg(value_parser = parse_method)]
    pub method: Method,

    /// Path of the resource, `/api` is prepended when missing
    pub path: String,

    /// JSON body of the request
    #[arg(long, short)]
    pub body: Option<String>,

    /// Query parameter in the form of `key=value`
    #[arg(long = "param", short, value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

#[derive(Subcommand)]
pub enum ToolSubcommand {
    /// Print the headers a request would be signed with
    Sign(SignArgs),

    /// Check a signature against the configured secret
    Verify(VerifyArgs),

    /// Perform a signed request and print the JSON response
    Request(RequestArgs),
}

/// Command line client for the person-profile backend
#[derive(Parser)]
#[command(about, version)]
pub struct ToolArgs {
    /// Path to a TOML configuration file
    ///
    /// Without it the `DOSSIER_`-prefixed environment variables are read
    #[arg(global = true, long, short)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub subcommand: ToolSubcommand,
}
