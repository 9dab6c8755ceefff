//! Sign-in, sign-out and account commands

use colored::Colorize;
use dialoguer::{Password, theme::ColorfulTheme};
use log::debug;
use serde::Serialize;

use crate::cli::args::GlobalOptions;
use crate::cli::context::TerminalNavigator;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::AuthApi;
use crate::client::models::{LoginRequest, RegisterRequest};
use crate::error::{Error, Result};
use crate::output;
use crate::token::Claims;

/// Result of a successful sign-in
#[derive(Debug, Serialize)]
struct SignInReport<'a> {
    role: &'a str,
    name: &'a str,
    redirect: &'a str,
    expires_at: String,
}

/// Check an address has the `local@domain.tld` shape with no whitespace.
pub fn validate_email(email: &str) -> Result<()> {
    let invalid = || Error::Validation(format!("'{email}' is not a valid email address"));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    // Needs a dot with at least one character on each side
    let dotted = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if dotted { Ok(()) } else { Err(invalid()) }
}

/// Reject empty or whitespace-only values.
pub fn require_filled(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::Validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

fn prompt_password(provided: Option<String>, prompt: &str, confirm: bool) -> Result<String> {
    let password = match provided {
        Some(password) => password,
        None => {
            let theme = ColorfulTheme::default();
            let mut input = Password::with_theme(&theme)
                .with_prompt(prompt)
                .validate_with(|input: &String| {
                    require_filled(input, "Password").map_err(|e| e.to_string())
                });
            if confirm {
                input = input.with_confirmation("Confirm password", "Passwords do not match");
            }
            input.interact()?
        }
    };

    require_filled(&password, "Password")?;
    Ok(password)
}

/// Store a freshly issued token and report where the user lands.
fn finish_sign_in(ctx: &CommandContext, token: &str) -> Result<()> {
    let claims: Claims = ctx.session.establish(token)?;
    let role = claims
        .recognized_role()
        .ok_or_else(|| Error::Other("signed-in role missing".to_string()))?;

    let report = SignInReport {
        role: role.as_str(),
        name: claims.display_name(),
        redirect: role.landing_route(),
        expires_at: claims.expires_at.to_rfc3339(),
    };

    match ctx.format {
        OutputFormat::Json => output::print(&report, OutputFormat::Json)?,
        OutputFormat::Pretty => {
            println!(
                "{} Signed in as {} ({})",
                "✓".green(),
                report.name.bold(),
                report.role
            );
            println!("{} {}", "→".dimmed(), report.redirect.dimmed());
        }
    }
    Ok(())
}

/// Run the login command
pub async fn login(opts: &GlobalOptions, email: String, password: Option<String>) -> Result<()> {
    validate_email(&email)?;
    let ctx = CommandContext::new(opts)?;
    let client = ctx.client()?;
    let password = prompt_password(password, "Password", false)?;

    let token = client.login(&LoginRequest { email, password }).await?;
    finish_sign_in(&ctx, &token)
}

/// Run the login-google command.
///
/// The provider's sign-in flow happens elsewhere; this exchanges its ID token
/// for a session token and stores it like any other sign-in.
pub async fn login_google(opts: &GlobalOptions, id_token: String) -> Result<()> {
    require_filled(&id_token, "ID token")?;
    let ctx = CommandContext::new(opts)?;
    let token = ctx.client()?.google_login(id_token.trim()).await?;
    finish_sign_in(&ctx, &token)
}

/// Run the register command
pub async fn register(
    opts: &GlobalOptions,
    name: String,
    email: String,
    phone: Option<String>,
    password: Option<String>,
) -> Result<()> {
    require_filled(&name, "Name")?;
    validate_email(&email)?;
    let ctx = CommandContext::new(opts)?;
    let client = ctx.client()?;
    let password = prompt_password(password, "Choose a password", true)?;

    let request = RegisterRequest {
        name,
        phone_number: phone.filter(|p| !p.trim().is_empty()),
        email,
        password,
    };
    let message = client.register(&request).await?;
    debug!("register: {:?}", message);

    println!("{} Registration successful. Please sign in.", "✓".green());
    println!("  → Run 'mola login --email {}'", request.email);
    Ok(())
}

/// Run the forgot-password command
pub async fn forgot_password(opts: &GlobalOptions, email: String) -> Result<()> {
    validate_email(&email)?;
    let ctx = CommandContext::new(opts)?;
    let message = ctx.client()?.forgot_password(&email).await?;

    println!(
        "{} {}",
        "✓".green(),
        message.unwrap_or_else(|| "Reset token sent".to_string())
    );
    println!("  → Run 'mola reset-password --token <TOKEN>' once it arrives");
    Ok(())
}

/// Run the reset-password command
pub async fn reset_password(
    opts: &GlobalOptions,
    token: String,
    password: Option<String>,
) -> Result<()> {
    require_filled(&token, "Reset token")?;
    let ctx = CommandContext::new(opts)?;
    let client = ctx.client()?;
    let password = prompt_password(password, "New password", true)?;

    client.reset_password(token.trim(), &password).await?;

    println!("{} Password reset. Please sign in again.", "✓".green());
    Ok(())
}

/// Run the profile command
pub async fn profile(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let profile = ctx.client()?.profile().await?;
    output::print(&profile, ctx.format)
}

/// Run the logout command
pub fn logout(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    ctx.session.logout(&TerminalNavigator)?;

    println!("{} Signed out", "✓".green());
    Ok(())
}
