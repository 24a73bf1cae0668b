//! ohmage command-line client.

use clap::{Parser, Subcommand};
use ohmage::cli;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ohmage", version, about = "Survey conditions and stream data sync")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse, validate and evaluate condition sentences
    Condition {
        #[command(subcommand)]
        action: ConditionCommand,
    },
    /// Survey show/hide logic
    Survey {
        #[command(subcommand)]
        action: SurveyCommand,
    },
    /// Local stream data buffer
    Stream {
        #[command(subcommand)]
        action: StreamCommand,
    },
    /// Account credentials used for sync
    Account {
        #[command(subcommand)]
        action: AccountCommand,
    },
    /// Upload buffered stream data
    Sync {
        /// Sync configuration file (JSON)
        #[arg(short, long, default_value = "ohmage.json")]
        config: PathBuf,
        /// Override the configured server URL
        #[arg(long)]
        server: Option<String>,
        #[arg(short, long, default_value = "ohmage.redb")]
        buffer: PathBuf,
        #[arg(short, long, default_value = "account.json")]
        account: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConditionCommand {
    /// Check that a condition is well formed
    Check {
        condition: String,
        /// Item definitions (JSON array) to validate against
        #[arg(short, long)]
        items: Option<PathBuf>,
    },
    /// Evaluate a condition against recorded responses
    Eval {
        condition: String,
        /// Responses (JSON object)
        #[arg(short, long)]
        responses: PathBuf,
    },
}

#[derive(Subcommand)]
enum SurveyCommand {
    /// List the items displayed given the responses so far
    Visible {
        survey: PathBuf,
        #[arg(short, long)]
        responses: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum StreamCommand {
    /// Buffer data points for upload
    Push {
        /// Stream as namespace:name:version
        #[arg(short, long)]
        stream: String,
        #[arg(short, long)]
        user: String,
        /// Data points (JSON array)
        points: PathBuf,
        #[arg(short, long, default_value = "ohmage.redb")]
        buffer: PathBuf,
    },
    /// Pending records per account
    Status {
        #[arg(short, long, default_value = "ohmage.redb")]
        buffer: PathBuf,
    },
}

#[derive(Subcommand)]
enum AccountCommand {
    /// Store account tokens
    Login {
        username: String,
        #[arg(long)]
        access_token: String,
        #[arg(long)]
        refresh_token: String,
        #[arg(short, long, default_value = "account.json")]
        account: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ohmage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let json = cli.json;
    let result = match cli.command {
        Command::Condition { action } => match action {
            ConditionCommand::Check { condition, items } => {
                cli::cmd_check(&condition, items.as_deref(), json).map(|_| ())
            }
            ConditionCommand::Eval {
                condition,
                responses,
            } => cli::cmd_eval(&condition, &responses, json).map(|_| ()),
        },
        Command::Survey {
            action: SurveyCommand::Visible { survey, responses },
        } => cli::cmd_survey(&survey, responses.as_deref(), json).map(|_| ()),
        Command::Stream { action } => match action {
            StreamCommand::Push {
                stream,
                user,
                points,
                buffer,
            } => cli::cmd_push(&buffer, &user, &stream, &points, json).map(|_| ()),
            StreamCommand::Status { buffer } => cli::cmd_status(&buffer, json).map(|_| ()),
        },
        Command::Account {
            action:
                AccountCommand::Login {
                    username,
                    access_token,
                    refresh_token,
                    account,
                },
        } => cli::cmd_login(&account, &username, &access_token, &refresh_token),
        Command::Sync {
            config,
            server,
            buffer,
            account,
        } => cli::cmd_sync(&config, server.as_deref(), &buffer, &account, json)
            .await
            .map(|_| ()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
