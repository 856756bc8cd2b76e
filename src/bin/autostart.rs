//! EthClip autostart helper
//!
//! Registers or unregisters the tray app to launch at login.

use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use ethclip_lib::autostart::{self, AutostartAction};

#[derive(Parser)]
#[command(name = "ethclip-autostart")]
#[command(about = "Manage EthClip launch at login", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch EthClip at login
    Install,
    /// Stop launching EthClip at login
    Remove,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let (action, done) = match cli.command {
        Some(Commands::Install) => (AutostartAction::Install, "installed"),
        Some(Commands::Remove) => (AutostartAction::Remove, "removed"),
        None => {
            let _ = Cli::command().print_help();
            return ExitCode::SUCCESS;
        }
    };

    match autostart::execute(action) {
        Ok(was_installed) => {
            match action {
                AutostartAction::Install if was_installed => {
                    println!("Autostart was already installed, entry refreshed.")
                }
                AutostartAction::Remove if !was_installed => {
                    println!("Autostart was not installed, nothing to remove.")
                }
                _ => {}
            }
            println!("Autostart successfully {}!", done);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
