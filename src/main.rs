use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::{info, warn};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

mod cli;
mod config;

use cli::{Cli, Commands, EnvCommands};
use config::Config;
use devhub::catalog::{CatalogSource, ToolDescriptor};
use devhub::controller::AppSession;
use devhub::environment::{Environment, EnvironmentRegistry};
use devhub::search::SearchIndex;
use devhub::storage::{FileStore, SharedStore};
use devhub::tools::{CommandRenderer, InputFile, ToolInput, ToolKind, Widget, WidgetContext};
use devhub::tui::{self, App, AppConfig, TuiRunner};

fn setup_logging(config: &Config, verbose: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("devhub")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("devhub.log");

    // The TUI owns the terminal, so logs only ever go to the file
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let default_level = if verbose {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("info")
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Session wired to the configured store, renderer and limits. Not loaded yet.
fn build_session(config: &Config) -> Result<AppSession> {
    let store: SharedStore = Arc::new(
        FileStore::open(&config.storage.dir)
            .context(format!("Failed to open store at {}", config.storage.dir.display()))?,
    );
    let context = WidgetContext::new(store.clone())
        .with_renderer(Arc::new(CommandRenderer::new(config.diagram.renderer_command.clone())))
        .with_listener(config.listener.settings())
        .with_page_size(config.viewer.page_size())
        .with_history_capacity(config.history.capacity);
    Ok(AppSession::new(store, context))
}

fn catalog_source(config: &Config) -> CatalogSource {
    CatalogSource::from_option(config.catalog.path.as_deref())
}

fn loaded_session(config: &Config) -> Result<AppSession> {
    let mut session = build_session(config)?;
    session.load(&catalog_source(config))?;
    if let Some(err) = session.load_error() {
        eprintln!("{} {}", "Warning:".yellow(), err);
    }
    Ok(session)
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    match &cli.command {
        None => run_tui(config).await,
        Some(Commands::Tools { category, search }) => {
            handle_tools_command(category.as_deref(), search.as_deref(), config)
        }
        Some(Commands::Categories) => handle_categories_command(config),
        Some(Commands::Run {
            tool,
            action,
            text,
            files,
            other,
            other_file,
            opts,
            out,
        }) => {
            let input = build_input(text.as_deref(), files, other.as_deref(), other_file.as_deref(), opts)?;
            handle_run_command(tool, action, &input, out.as_deref(), config)
        }
        Some(Commands::Env { command }) => handle_env_command(command, config),
        Some(Commands::History { tool, clear }) => handle_history_command(tool, *clear, config),
        Some(Commands::Listen {
            connection,
            queue,
            count,
        }) => handle_listen_command(connection, queue, *count, config).await,
    }
}

async fn run_tui(config: &Config) -> Result<()> {
    info!("Launching TUI mode");
    let session = build_session(config)?;
    let app_config = AppConfig {
        tick_rate_ms: config.tui.tick_rate_ms,
        export_dir: config.tui.export_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
    };
    let mut app = App::new(session, app_config);
    app.load(&catalog_source(config))?;

    let terminal = tui::init_terminal()?;
    let mut runner = TuiRunner::new(terminal, app);
    let result = runner.run().await;
    tui::restore_terminal()?;
    result
}

fn print_tool(tool: &ToolDescriptor) {
    if tool.enabled {
        println!("{} {:<22} {}", tool.icon, tool.id.green(), tool.name);
    } else {
        println!(
            "{} {:<22} {} {}",
            tool.icon,
            tool.id.dimmed(),
            tool.name.dimmed(),
            "(coming soon)".yellow()
        );
    }
}

fn handle_tools_command(category: Option<&str>, search: Option<&str>, config: &Config) -> Result<()> {
    let session = loaded_session(config)?;
    let index = SearchIndex::new(session.catalog().tools().to_vec());
    let mut tools = index.search(search.unwrap_or(""));
    if let Some(category) = category {
        tools.retain(|t| t.category == category);
    }

    if tools.is_empty() {
        println!("{}", "No tools match.".yellow());
    }
    for tool in &tools {
        print_tool(tool);
    }
    Ok(())
}

fn handle_categories_command(config: &Config) -> Result<()> {
    let session = loaded_session(config)?;
    for entry in session.categories_with_counts() {
        println!(
            "{} {:<12} {} ({})",
            entry.category.icon,
            entry.category.id.cyan(),
            entry.category.name,
            entry.count
        );
    }
    Ok(())
}

/// Expand glob patterns; a pattern matching nothing is taken as a literal path.
fn expand_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let matched: Vec<PathBuf> = glob::glob(pattern)
            .context(format!("Invalid file pattern {}", pattern))?
            .filter_map(|entry| entry.ok())
            .collect();
        if matched.is_empty() {
            paths.push(PathBuf::from(pattern));
        } else {
            paths.extend(matched);
        }
    }
    Ok(paths)
}

fn build_input(
    text: Option<&str>,
    files: &[String],
    other: Option<&str>,
    other_file: Option<&Path>,
    opts: &[(String, String)],
) -> Result<ToolInput> {
    let text = match text {
        Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
        Some(t) => t.to_string(),
        None => String::new(),
    };

    let secondary = match (other, other_file) {
        (_, Some(path)) => fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?,
        (Some(o), None) => o.to_string(),
        (None, None) => String::new(),
    };

    let mut input = ToolInput::text(text).with_secondary(secondary);
    for (key, value) in opts {
        input = input.with_option(key.clone(), value.clone());
    }
    for path in expand_files(files)? {
        let bytes = fs::read(&path).context(format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        input = input.with_file(InputFile::new(name, bytes));
    }
    Ok(input)
}

fn handle_run_command(tool: &str, action: &str, input: &ToolInput, out: Option<&Path>, config: &Config) -> Result<()> {
    info!("Running {} {}", tool, action);
    let mut session = loaded_session(config)?;
    let output = session.run_tool(tool, action, input)?;

    if output.is_error {
        eprintln!("{}", output.content.red());
        return Err(eyre!("{} {} failed", tool, action));
    }
    println!("{}", output.content);

    if let Some(export) = &output.export {
        let path = export.save_to(out).context("Failed to write export")?;
        println!("{} {}", "Saved:".green(), path.display());
    }
    Ok(())
}

fn print_environment(env: &Environment, active: bool) {
    let marker = if active { "●".green() } else { "○".dimmed() };
    println!(
        "{} {} {} ({}/{} set)",
        marker,
        env.id_str().cyan(),
        env.name,
        env.configured_count(),
        env.variables.len()
    );
}

fn require_environment(registry: &EnvironmentRegistry, id: &str) -> Result<Environment> {
    registry
        .get(id)
        .ok_or_else(|| eyre!("No environment with id {}", id))
}

fn handle_env_command(command: &EnvCommands, config: &Config) -> Result<()> {
    let session = build_session(config)?;
    let registry = session.environments();
    let active = registry.active_id();

    match command {
        EnvCommands::List => {
            let envs = registry.list_all();
            if envs.is_empty() {
                println!("{}", "No environments".yellow());
            }
            for env in &envs {
                print_environment(env, active.as_deref() == Some(env.id_str()));
            }
        }
        EnvCommands::Show { id } => {
            let env = require_environment(registry, id)?;
            print_environment(&env, active.as_deref() == Some(env.id_str()));
            if !env.description.is_empty() {
                println!("  {}", env.description.dimmed());
            }
            for (key, value) in &env.variables {
                println!("  {} = {}", format!("{{{{{}}}}}", key).cyan(), value);
            }
        }
        EnvCommands::Create {
            name,
            description,
            vars,
        } => {
            let mut env = Environment {
                name: name.clone(),
                ..Environment::default_template()
            };
            if let Some(description) = description {
                env = env.with_description(description.clone());
            }
            for (key, value) in vars {
                env = env.with_variable(key.clone(), value.clone());
            }
            let saved = registry.save(env).ok_or_else(|| eyre!("Failed to save environment"))?;
            println!("{} {} ({})", "Created:".green(), saved.name, saved.id_str());
        }
        EnvCommands::Set { id, key, value } => {
            require_environment(registry, id)?;
            if !registry.add_variable(id, key, value) {
                return Err(eyre!("Failed to save variable"));
            }
            println!("{} {} in {}", "Set:".green(), key, id);
        }
        EnvCommands::Delete { id } => {
            require_environment(registry, id)?;
            if !registry.delete(id) {
                return Err(eyre!("Failed to delete environment"));
            }
            println!("{} {}", "Deleted:".green(), id);
        }
        EnvCommands::Activate { id } => {
            let env = require_environment(registry, id)?;
            if !registry.set_active(id) {
                return Err(eyre!("Failed to activate environment"));
            }
            println!("{} {}", "Active:".green(), env.name);
        }
        EnvCommands::Active => match registry.get_active() {
            Some(env) => print_environment(&env, true),
            None => println!("{}", "No active environment".yellow()),
        },
        EnvCommands::Substitute { text } => println!("{}", registry.substitute(text)),
    }
    Ok(())
}

fn handle_history_command(tool: &str, clear: bool, config: &Config) -> Result<()> {
    let session = build_session(config)?;
    let configs = &session.factory().context().configs;

    if clear {
        if !configs.clear_history(tool) {
            return Err(eyre!("Failed to clear history for {}", tool));
        }
        println!("{} history of {}", "Cleared:".green(), tool);
        return Ok(());
    }

    let history = configs.load_history(tool);
    if history.is_empty() {
        println!("{}", "No saved configurations".yellow());
    }
    for (i, entry) in history.iter().enumerate() {
        println!(
            "[{}] {} - {} {}",
            i,
            entry.label.cyan(),
            entry.queue_name,
            format!("({})", entry.timestamp).dimmed()
        );
    }
    Ok(())
}

fn listener_received(session: &AppSession) -> usize {
    session
        .current_widget()
        .and_then(Widget::as_listener)
        .map_or(0, |l| l.received_count())
}

async fn handle_listen_command(connection: &str, queue: &str, count: usize, config: &Config) -> Result<()> {
    let mut session = loaded_session(config)?;
    session.open_tool(ToolKind::Listener.id())?;

    let input = ToolInput::new()
        .with_option("connectionString", connection)
        .with_option("queueName", queue);
    let started = session.run_current("start", &input)?;
    if started.is_error {
        session.close_tool()?;
        eprintln!("{}", started.content.red());
        return Err(eyre!("Listener did not start"));
    }
    println!("{}", started.content.cyan());

    let mut poll = tokio::time::interval(Duration::from_millis(100));
    let mut seen = 0;
    loop {
        tokio::select! {
            _ = poll.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                warn!("Listener interrupted");
                break;
            }
        }
        let received = listener_received(&session);
        if received > seen {
            seen = received;
            println!("{} {}/{}", "Received".green(), seen, count);
        }
        if seen >= count {
            break;
        }
    }

    let stopped = session.run_current("stop", &ToolInput::new())?;
    if let Some(listener) = session.current_widget().and_then(Widget::as_listener) {
        println!("{}", listener.render_log());
    }
    println!("{}", stopped.content.cyan());
    session.close_tool()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&config, cli.is_verbose()).context("Failed to setup logging")?;
    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
