// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every option can also come from an environment variable, because the tool
// mostly runs inside CI jobs where env vars are the natural way to configure
// a step (DOCS_PATH, USE_TOKEN, JWT_TOKEN, TRUSTED_HOSTS, ...).
//
// `Cli` is the raw parse result; `Cli::into_config` turns it into the
// validated `Config` the rest of the program uses.
// =============================================================================

use crate::checker::TrustedHosts;
use crate::config::{Config, Credential, OutputFormat};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "docs-link-gate",
    version,
    about = "Check every link in a documentation directory",
    long_about = "docs-link-gate scans a directory of documentation files for inline links, \
                  checks each one with an HTTP HEAD request, and exits with status 1 if any \
                  link is broken or if an empty image link (![](url)) is found. \
                  It is meant to run as a quality gate in CI."
)]
pub struct Cli {
    /// Directory containing the documents to scan
    #[arg(long, env = "DOCS_PATH", default_value = "./docs")]
    pub docs_path: PathBuf,

    /// Send the bearer token (JWT_TOKEN) to trusted hosts
    #[arg(long, env = "USE_TOKEN")]
    pub use_token: bool,

    /// Bearer token for trusted hosts
    #[arg(long, env = "JWT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Host, *.domain or URL prefix allowed to receive the token
    ///
    /// Repeat the flag or separate entries with commas.
    #[arg(long = "trusted-host", env = "TRUSTED_HOSTS", value_delimiter = ',')]
    pub trusted_hosts: Vec<String>,

    /// File extension that marks a document (repeatable)
    #[arg(
        long = "extension",
        env = "DOCS_EXTENSIONS",
        value_delimiter = ',',
        default_value = "md"
    )]
    pub extensions: Vec<String>,

    /// Also scan subdirectories
    #[arg(long, env = "DOCS_RECURSIVE")]
    pub recursive: bool,

    /// Timeout for each link check, in seconds
    #[arg(
        long,
        env = "LINK_TIMEOUT",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Maximum number of links checked at the same time within a document
    #[arg(
        long,
        env = "LINK_CONCURRENCY",
        default_value_t = 50,
        value_parser = clap::value_parser!(u16).range(1..=256)
    )]
    pub concurrency: u16,

    /// Repeat a HEAD request as GET when the server answers 405 or 501
    #[arg(long, env = "GET_FALLBACK")]
    pub get_fallback: bool,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Print failures as GitHub Actions error annotations
    #[arg(long, env = "GITHUB_ACTIONS")]
    pub github_annotations: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    // Resolves the parsed arguments into a Config
    //
    // The token is only kept when USE_TOKEN is on and the token is non-blank.
    // Misconfigurations are warned about, not fatal: the run simply goes
    // ahead without authentication.
    pub fn into_config(self) -> Config {
        let trusted_hosts = TrustedHosts::parse(&self.trusted_hosts);

        let credential = if self.use_token {
            let credential = self.token.and_then(Credential::new);
            if credential.is_none() {
                warn!("USE_TOKEN is set but JWT_TOKEN is empty; checking links without a token");
            } else if trusted_hosts.is_empty() {
                warn!("USE_TOKEN is set but no trusted hosts are configured; the token will not be sent");
            }
            credential
        } else {
            None
        };

        let extensions = self
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();

        Config {
            docs_path: self.docs_path,
            extensions,
            recursive: self.recursive,
            credential,
            trusted_hosts,
            timeout: Duration::from_secs(self.timeout),
            concurrency: usize::from(self.concurrency),
            get_fallback: self.get_fallback,
            output: if self.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            github_annotations: self.github_annotations,
        }
    }
}
