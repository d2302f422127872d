mod commands;
mod console;
mod session;

use clap::{Parser, Subcommand};
use commands::{Mode, Outcome};
use std::io::Write;

#[derive(Parser)]
#[command(
    name = "runway",
    about = "Configure and deploy a Cloud Run service with Terraform"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect deployment settings and write terraform/terraform.tfvars
    Configure,
    /// Configure, then authenticate and run terraform init, plan and apply
    Deploy,
    /// Check gcloud credentials and log in if needed
    Login,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Configure => commands::wizard(Mode::InteractiveOnly).await,
        Commands::Deploy => commands::wizard(Mode::FullyAutomated).await,
        Commands::Login => commands::login().await,
    };

    let code = match result {
        Ok(Outcome::Cancelled) => {
            println!("\nConfiguration cancelled by user.\n");
            0
        }
        Ok(outcome) => {
            tracing::debug!(?outcome, "finished");
            0
        }
        Err(e) => {
            eprintln!("\nError: {}\n", sanitize(&format!("{e:#}")));
            1
        }
    };

    // A prompt may still be blocked on stdin; exit without waiting for it.
    if let Err(e) = std::io::stdout().flush() {
        tracing::debug!(error = %e, "stdout flush failed");
    }
    std::process::exit(code);
}

/// Strip ANSI escape sequences and other control characters from a message
/// before display.
fn sanitize(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut chars = message.chars();

    while let Some(c) = chars.next() {
        match c {
            '\u{1b}' => {
                // CSI: ESC '[' parameters final-byte
                if chars.clone().next() == Some('[') {
                    chars.next();
                    for c in chars.by_ref() {
                        if ('@'..='~').contains(&c) {
                            break;
                        }
                    }
                }
            }
            '\n' | '\t' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out
}
