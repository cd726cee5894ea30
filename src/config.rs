use clap::{ArgAction, Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf};

use crate::{
    fetch::{DEFAULT_USER_AGENT, browser_headers},
    normalize::DEFAULT_ORIGIN,
    resolver::ResolverSettings,
};

#[derive(Parser, Debug)]
#[command(
    name = "postgrab",
    version,
    about = "Resolve Instagram post, reel and story links to direct media URLs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub config: Config,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Resolve one reference and print the result as JSON
    Resolve {
        /// Post/reel/story URL, bare shortcode, username or CDN media URL
        reference: String,
    },
}

/// Postgrab configuration
#[derive(Parser, Debug, Clone)]
pub struct Config {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease verbosity (-q, -qq, -qqq)
    #[arg(short = 'q', action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Address to bind the HTTP server to
    #[arg(long, env = "POSTGRAB_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Optional log file path (logs always go to stderr as well)
    #[arg(long, env = "POSTGRAB_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Per-document fetch timeout in milliseconds
    #[arg(long, env = "POSTGRAB_TIMEOUT_MS", default_value_t = 10_000, global = true)]
    pub timeout_ms: u64,

    /// Site origin used to build canonical, embed and API URLs
    #[arg(long, env = "POSTGRAB_ORIGIN", default_value = DEFAULT_ORIGIN, global = true)]
    pub origin: String,

    /// User-Agent sent with every page request
    #[arg(long, env = "POSTGRAB_USER_AGENT", default_value = DEFAULT_USER_AGENT, global = true)]
    pub user_agent: String,

    /// Mirror origins tried after the site itself (repeatable or comma separated)
    #[arg(long = "mirror", env = "POSTGRAB_MIRRORS", value_delimiter = ',', global = true)]
    pub mirrors: Vec<String>,

    /// Do not try the embed page variant
    #[arg(long, env = "POSTGRAB_SKIP_EMBED", global = true)]
    pub skip_embed: bool,

    /// Do not try the JSON API variant
    #[arg(long, env = "POSTGRAB_SKIP_API", global = true)]
    pub skip_api: bool,
}

impl Config {
    #[must_use]
    pub fn verbosity_delta(&self) -> i16 {
        i16::from(self.verbose) - i16::from(self.quiet)
    }

    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity_delta() {
            d if d <= -2 => "error",
            -1 => "warn",
            0 => "info,postgrab=info,axum=info,tower_http=info,reqwest=warn,hyper=warn",
            1 => "debug,postgrab=debug,axum=info,tower_http=info,reqwest=info,hyper=warn,html5ever=warn,selectors=warn",
            2 => "trace,postgrab=trace,axum=debug,tower_http=trace,reqwest=debug,hyper=info,html5ever=info,selectors=info",
            _ => "trace,postgrab=trace,axum=trace,tower_http=trace,reqwest=trace,hyper=debug",
        }
    }

    /// Library-side view of the configuration.
    #[must_use]
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            origin: self.origin.trim_end_matches('/').to_string(),
            headers: browser_headers(&self.user_agent),
            timeout_ms: self.timeout_ms,
            embed_variant: !self.skip_embed,
            api_variant: !self.skip_api,
            mirrors: self
                .mirrors
                .iter()
                .map(|m| m.trim().trim_end_matches('/').to_string())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }
}
