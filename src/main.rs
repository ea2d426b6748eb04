//! envsync CLI
//!
//! Entry point for the `envsync` command-line tool.

use clap::{Parser, Subcommand};
use envsync::config::{SyncConfig, CONFIG_FILE_NAME};
use envsync::prompt::TerminalPrompter;
use envsync::{discover_workspaces, run_diagnose, run_pass, PassOptions, PluginRegistry};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "envsync")]
#[command(about = "Schema-driven env file reconciliation", version)]
struct Cli {
    /// Monorepo root (default: current directory)
    #[arg(long, short = 'C', global = true)]
    root: Option<PathBuf>,

    /// Path to config file (default: <root>/envsync.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve missing variables and write them to local env files
    Sync {
        /// Never prompt; unresolvable variables get marked placeholders
        #[arg(long)]
        non_interactive: bool,

        /// Output the pass summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report missing/extra/deprecated variables without writing
    Check {
        /// Output the pass summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scan source code for env references and cross-check declarations
    Diagnose {
        /// Output the diagnosis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Workspace inspection commands
    Workspaces {
        #[command(subcommand)]
        action: WorkspacesCommands,
    },
}

#[derive(Subcommand)]
enum WorkspacesCommands {
    /// List discovered workspaces
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let root = cli
        .root
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| root.join(CONFIG_FILE_NAME));

    let loaded = match SyncConfig::load(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(2);
        }
    };

    // Plugins register here before anything runs; the registry is
    // read-only from this point on
    let registry = PluginRegistry::new();

    match cli.command {
        Commands::Sync {
            non_interactive,
            json,
        } => {
            let interactive = !non_interactive && std::io::stdin().is_terminal();
            let prompter = TerminalPrompter;
            let options = PassOptions {
                interactive,
                write: true,
            };

            match run_pass(&root, &loaded, &registry, &prompter, options) {
                Ok(summary) => {
                    print_summary(json, summary.to_json(), summary.to_human());
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(e.exit_code());
                }
            }
        }

        Commands::Check { json } => {
            let prompter = TerminalPrompter;
            let options = PassOptions {
                interactive: false,
                write: false,
            };

            match run_pass(&root, &loaded, &registry, &prompter, options) {
                Ok(summary) => {
                    print_summary(json, summary.to_json(), summary.to_human());
                    if summary.check_failed() || summary.total_missing() > 0 {
                        process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(e.exit_code());
                }
            }
        }

        Commands::Diagnose { json } => match run_diagnose(&root, &loaded, &registry) {
            Ok(summary) => {
                print_summary(json, summary.to_json(), summary.to_human());
                if !summary.is_clean() {
                    process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(e.exit_code());
            }
        },

        Commands::Workspaces { action } => match action {
            WorkspacesCommands::List { json } => {
                match discover_workspaces(&root, &loaded.config) {
                    Ok(workspaces) => {
                        if json {
                            match serde_json::to_string_pretty(&workspaces) {
                                Ok(out) => println!("{}", out),
                                Err(e) => {
                                    eprintln!("Error: {}", e);
                                    process::exit(1);
                                }
                            }
                        } else {
                            for workspace in workspaces {
                                println!("{}\t{}", workspace.name, workspace.root.display());
                            }
                        }
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        process::exit(2);
                    }
                }
            }
        },
    }
}

fn print_summary(json: bool, as_json: Result<String, serde_json::Error>, human: String) {
    if json {
        match as_json {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error serializing summary: {}", e);
                process::exit(1);
            }
        }
    } else {
        print!("{}", human);
    }
}
