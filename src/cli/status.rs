//! Status command implementation

use chrono::Utc;
use colored::Colorize;
use serde::Serialize;

use crate::cli::{CommandContext, OutputFormat};
use crate::cli::args::GlobalOptions;
use crate::config::{self, Config};
use crate::error::Result;
use crate::output::{self, formatters};
use crate::session::AuthState;
use crate::token::Claims;

/// Machine-readable status record
#[derive(Debug, Serialize)]
struct StatusReport {
    api_base_url: String,
    api_base_url_valid: bool,
    config_path: String,
    session_path: String,
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    claims: Option<Claims>,
}

/// Run the status command to display session status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let state = ctx.session.state();
    let claims = ctx.session.claims()?;

    let report = StatusReport {
        api_base_url: ctx.configured_base_url().to_string(),
        api_base_url_valid: config::validate_base_url(ctx.configured_base_url()).is_ok(),
        config_path: Config::resolve_path(opts.config_ref())?
            .display()
            .to_string(),
        session_path: ctx.storage.path().display().to_string(),
        authenticated: state.is_authenticated(),
        role: state.role().map(|r| r.to_string()),
        claims,
    };

    match ctx.format {
        OutputFormat::Json => output::print(&report, OutputFormat::Json),
        OutputFormat::Pretty => {
            print_pretty(&report, state);
            Ok(())
        }
    }
}

fn print_pretty(report: &StatusReport, state: AuthState) {
    println!("{}\n", "MOLA Session Status".bold());
    if report.api_base_url_valid {
        println!("API base URL: {}", report.api_base_url.cyan());
    } else {
        println!(
            "API base URL: {} {}",
            report.api_base_url.red(),
            "(invalid, run 'mola init')".dimmed()
        );
    }
    println!("Config file: {}", report.config_path.dimmed());
    println!("Session file: {}", report.session_path.dimmed());
    println!();

    match (state, &report.claims) {
        (AuthState::Authenticated(role), Some(claims)) => {
            println!("{} Signed in as {} ({})", "✓".green(), claims.display_name().bold(), role);
            if let Some(email) = &claims.email {
                println!("  Email: {}", email);
            }
            println!(
                "  Session expires {} (in {})",
                formatters::format_local_time(claims.expires_at),
                formatters::format_remaining(claims.expires_at, Utc::now())
            );
        }
        (AuthState::Authenticated(role), None) => {
            println!("{} Signed in ({})", "✓".green(), role);
        }
        (AuthState::Unauthenticated, _) => {
            println!("{} Not signed in", "○".dimmed());
            println!("  → Run 'mola login --email <EMAIL>' to sign in");
        }
    }

    println!();
}
