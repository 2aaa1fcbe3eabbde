//! CLI command definitions using clap.
//!
//! Without a subcommand devhub opens the TUI. The subcommands drive the
//! same session headlessly:
//! - tools / categories: browse the catalog
//! - run: run one action of one tool
//! - env: manage environments and substitute variables
//! - history: saved connection history of a messaging tool
//! - listen: run the simulated listener for a number of messages

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// devhub - developer utilities in one terminal hub
#[derive(Parser, Debug)]
#[command(name = "devhub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tools
    Tools {
        /// Only tools in this category
        #[arg(long)]
        category: Option<String>,

        /// Only tools matching this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// List categories with tool counts
    Categories,

    /// Run one action of a tool
    Run {
        /// Tool id, e.g. json-beautifier
        tool: String,

        /// Action name, e.g. beautify
        action: String,

        /// Main text input; read from stdin when "-"
        text: Option<String>,

        /// Input file (repeatable, glob patterns allowed)
        #[arg(short, long = "file")]
        files: Vec<String>,

        /// Second text input (diff right side, message properties)
        #[arg(long)]
        other: Option<String>,

        /// Read the second text input from a file
        #[arg(long, conflicts_with = "other")]
        other_file: Option<PathBuf>,

        /// Tool option as key=value (repeatable)
        #[arg(short, long = "opt", value_parser = parse_key_value)]
        opts: Vec<(String, String)>,

        /// Where to write an exported file (file or directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Manage environments
    Env {
        #[command(subcommand)]
        command: EnvCommands,
    },

    /// Show or clear saved connection history of a tool
    History {
        /// Tool id, e.g. servicebus-sender
        tool: String,

        /// Clear the history instead of showing it
        #[arg(long)]
        clear: bool,
    },

    /// Run the simulated listener until N messages arrived
    Listen {
        /// Connection string ({{var}} placeholders allowed)
        connection: String,

        /// Queue or topic name ({{var}} placeholders allowed)
        queue: String,

        /// Messages to wait for
        #[arg(short = 'n', long, default_value_t = 3)]
        count: usize,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum EnvCommands {
    /// List environments
    List,

    /// Show one environment
    Show { id: String },

    /// Create an environment from the standard template
    Create {
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Variable as key=value (repeatable)
        #[arg(long = "var", value_parser = parse_key_value)]
        vars: Vec<(String, String)>,
    },

    /// Set a variable
    Set { id: String, key: String, value: String },

    /// Delete an environment
    Delete { id: String },

    /// Make an environment active
    Activate { id: String },

    /// Show the active environment
    Active,

    /// Replace {{var}} placeholders using the active environment
    Substitute { text: String },
}

/// Split `key=value` at the first `=`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["devhub"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from(["devhub", "tools", "-v", "-c", "/tmp/devhub.yml"]).unwrap();
        assert!(cli.is_verbose());
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/devhub.yml")));
    }

    #[test]
    fn test_tools_filters() {
        let cli = Cli::try_parse_from(["devhub", "tools", "--category", "encoders", "-s", "hash"]).unwrap();
        match cli.command {
            Some(Commands::Tools { category, search }) => {
                assert_eq!(category.as_deref(), Some("encoders"));
                assert_eq!(search.as_deref(), Some("hash"));
            }
            _ => panic!("Expected tools command"),
        }
    }

    #[test]
    fn test_run_full() {
        let cli = Cli::try_parse_from([
            "devhub",
            "run",
            "csv-to-excel",
            "convert",
            "--file",
            "data/*.csv",
            "--opt",
            "delimiter=;",
            "-o",
            "header=false",
            "--out",
            "out.xls",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Run {
                tool,
                action,
                text,
                files,
                opts,
                out,
                ..
            }) => {
                assert_eq!(tool, "csv-to-excel");
                assert_eq!(action, "convert");
                assert!(text.is_none());
                assert_eq!(files, vec!["data/*.csv"]);
                assert_eq!(
                    opts,
                    vec![
                        ("delimiter".to_string(), ";".to_string()),
                        ("header".to_string(), "false".to_string())
                    ]
                );
                assert_eq!(out, Some(PathBuf::from("out.xls")));
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_run_other_conflicts() {
        let result = Cli::try_parse_from([
            "devhub",
            "run",
            "diff-checker",
            "compare",
            "a",
            "--other",
            "b",
            "--other-file",
            "b.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_option_rejected() {
        assert!(Cli::try_parse_from(["devhub", "run", "guid-generator", "generate", "--opt", "nokey"]).is_err());
    }

    #[test]
    fn test_env_create() {
        let cli = Cli::try_parse_from([
            "devhub",
            "env",
            "create",
            "Dev",
            "-d",
            "local",
            "--var",
            "queue=orders",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Env {
                command: EnvCommands::Create {
                    name,
                    description,
                    vars,
                },
            }) => {
                assert_eq!(name, "Dev");
                assert_eq!(description.as_deref(), Some("local"));
                assert_eq!(vars, vec![("queue".to_string(), "orders".to_string())]);
            }
            _ => panic!("Expected env create command"),
        }
    }

    #[test]
    fn test_env_set_and_substitute() {
        let cli = Cli::try_parse_from(["devhub", "env", "set", "env_1", "queue", "orders"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Env {
                command: EnvCommands::Set { .. }
            })
        ));

        let cli = Cli::try_parse_from(["devhub", "env", "substitute", "{{queue}}"]).unwrap();
        match cli.command {
            Some(Commands::Env {
                command: EnvCommands::Substitute { text },
            }) => assert_eq!(text, "{{queue}}"),
            _ => panic!("Expected env substitute command"),
        }
    }

    #[test]
    fn test_history_clear() {
        let cli = Cli::try_parse_from(["devhub", "history", "servicebus-sender", "--clear"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::History { clear: true, .. })));
    }

    #[test]
    fn test_listen_default_count() {
        let cli = Cli::try_parse_from(["devhub", "listen", "Endpoint=sb://x/", "orders"]).unwrap();
        match cli.command {
            Some(Commands::Listen { count, queue, .. }) => {
                assert_eq!(count, 3);
                assert_eq!(queue, "orders");
            }
            _ => panic!("Expected listen command"),
        }
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("connectionString=Endpoint=sb://x/;Key=1").unwrap(),
            ("connectionString".to_string(), "Endpoint=sb://x/;Key=1".to_string())
        );
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
