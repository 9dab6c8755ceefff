//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};
use log::warn;

use crate::cli::args::GlobalOptions;
use crate::client::DEFAULT_API_BASE_URL;
use crate::config::{self, Config};
use crate::error::Result;

/// Run the init command
///
/// Writes the API base URL to the config file. A `--api-url` flag skips the
/// prompt.
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}", "Welcome to MOLA!".bold().green());
    println!("Let's point the CLI at your storefront backend.\n");

    let mut config = Config::load_or_default(opts.config_ref())?;

    let api_base_url = match opts.api_url_ref() {
        Some(url) => url.to_string(),
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt("API base URL")
            .default(prompt_default(&config))
            .validate_with(|input: &String| {
                config::validate_base_url(input).map_err(|e| e.to_string())
            })
            .interact_text()?,
    };
    config::validate_base_url(&api_base_url)?;

    config.api_base_url = Some(api_base_url.trim_end_matches('/').to_string());
    config.save_at(opts.config_ref())?;

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Sign in", "mola login --email <EMAIL>".cyan());
    println!("  {} - Show session status", "mola status".cyan());

    Ok(())
}

/// The stored URL when it is usable, otherwise the compiled-in default.
fn prompt_default(config: &Config) -> String {
    config.api_base_url(None).unwrap_or_else(|err| {
        warn!("ignoring stored base URL: {}", err);
        DEFAULT_API_BASE_URL.to_string()
    })
}
