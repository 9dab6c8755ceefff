//! MOLA CLI - session and API companion for the MOLA storefront

use clap::Parser;

use mola::cli::{self, Cli, Commands};
use mola::cli::args::GlobalOptions;
use mola::cli::request::Verb;
use mola::error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts),
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("mola version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Login { email, password } => cli::auth::login(&opts, email, password).await,
        Commands::LoginGoogle { id_token } => cli::auth::login_google(&opts, id_token).await,
        Commands::Register {
            name,
            email,
            phone,
            password,
        } => cli::auth::register(&opts, name, email, phone, password).await,
        Commands::ForgotPassword { email } => cli::auth::forgot_password(&opts, email).await,
        Commands::ResetPassword { token, password } => {
            cli::auth::reset_password(&opts, token, password).await
        }
        Commands::Profile => cli::auth::profile(&opts).await,
        Commands::Logout => cli::auth::logout(&opts),
        Commands::Get { path, auth } => {
            cli::request::run(&opts, Verb::Get, &path, None, &auth).await
        }
        Commands::Post { path, body, auth } => {
            cli::request::run(&opts, Verb::Post, &path, Some(&body), &auth).await
        }
        Commands::Put { path, body, auth } => {
            cli::request::run(&opts, Verb::Put, &path, Some(&body), &auth).await
        }
        Commands::Delete { path, auth } => {
            cli::request::run(&opts, Verb::Delete, &path, None, &auth).await
        }
    }
}
