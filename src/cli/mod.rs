pub mod config;
pub mod history;
pub mod process;
pub mod status;

use std::{env, path::PathBuf};

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use config::{process_config_command, ConfigCommand};
use history::render_history;
use process::{kill_previous_servers, restart_server};
use status::render_status;
use tracing::level_filters::LevelFilter;

use crate::{
    daemon::start_daemon,
    settings::{JsonSettingsStore, SettingsStore},
    storage::{
        control::ControlStore,
        day_record_store::{DayRecordStore, JsonDayRecordStore},
        status::StatusStore,
    },
    utils::{
        dir::resolve_application_path,
        logging::{enable_logging, LogTarget},
    },
};

#[derive(Parser, Debug)]
#[command(name = "sundown", version, long_about = None)]
#[command(about = "Keeps your work day within a daily limit", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Starts a daemon for the application")]
    Init,
    #[command(
        about = "Run a daemon directly in current console. Used for creating a daemon internally and for debugging"
    )]
    Serve,
    #[command(about = "Stop currently running daemon")]
    Stop,
    #[command(about = "Show the current work session")]
    Status,
    #[command(about = "Show or change settings")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    #[command(about = "Stop counting time until resumed")]
    Pause,
    #[command(about = "Continue counting time")]
    Resume,
    #[command(about = "Count time as break time")]
    Break {
        #[command(subcommand)]
        command: BreakCommand,
    },
    #[command(about = "Start the current day over")]
    Reset,
    #[command(about = "Show totals of every recorded day")]
    History,
}

impl Commands {
    fn log_target(&self) -> LogTarget {
        match self {
            Commands::Serve => LogTarget::Daemon,
            _ => LogTarget::Cli,
        }
    }
}

#[derive(Subcommand, Debug)]
enum BreakCommand {
    Start,
    End,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = resolve_application_path(args.dir)?;
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(args.commands.log_target(), &app_dir, logging_level, args.log)?;

    let control = ControlStore::new(&app_dir);
    match args.commands {
        Commands::Init => restart_server(&app_dir),
        Commands::Serve => start_daemon(app_dir).await,
        Commands::Stop => {
            let stopped = kill_previous_servers(&env::current_exe()?)?;
            println!("Stopped {stopped} daemon(s)");
            Ok(())
        }
        Commands::Status => {
            let settings = JsonSettingsStore::new(&app_dir).load().await?;
            let snapshot = StatusStore::new(&app_dir).load().await?;
            for line in render_status(&settings, snapshot.as_ref(), Utc::now()) {
                println!("{line}");
            }
            Ok(())
        }
        Commands::Config { command } => {
            process_config_command(&JsonSettingsStore::new(&app_dir), command).await
        }
        Commands::Pause => {
            control.set_paused(true).await?;
            println!("Session paused");
            Ok(())
        }
        Commands::Resume => {
            control.set_paused(false).await?;
            println!("Session resumed");
            Ok(())
        }
        Commands::Break { command } => {
            let active = matches!(command, BreakCommand::Start);
            control.set_break_active(active).await?;
            println!("{}", if active { "Break started" } else { "Break ended" });
            Ok(())
        }
        Commands::Reset => {
            control.request_reset().await?;
            println!("Session reset requested");
            Ok(())
        }
        Commands::History => {
            let records = JsonDayRecordStore::new(&app_dir).load_all().await?;
            for line in render_history(&records) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::utils::logging::LogTarget;

    use super::Args;

    #[test]
    fn test_serve_logs_as_daemon() {
        let serve = Args::parse_from(["sundown", "serve", "--dir", "/tmp/sundown"]);
        assert_eq!(serve.commands.log_target(), LogTarget::Daemon);

        let status = Args::parse_from(["sundown", "--log", "status"]);
        assert_eq!(status.commands.log_target(), LogTarget::Cli);
        assert!(status.log);
    }
}
