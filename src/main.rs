use clap::{Arg, ArgMatches, Command};
use color_eyre::Result;
use std::sync::Arc;
use std::time::Duration;

mod adapters;
mod application;
mod domain;
mod ports;

use adapters::{
    api::{DocumentStoreClient, RemoteTodoRepository},
    config::FileConfigStore,
    tui::run_tui,
};
use application::{TodoState, TodoStore};
use domain::TodoId;
use ports::{AppConfig, ConfigStore};

fn cli() -> Command {
    Command::new("todo-tui")
        .version("0.1.0")
        .about("A terminal TODO list backed by a remote JSON document store")
        .long_about("Add, complete and delete tasks kept in a remote JSON document store.\n\nRun without a subcommand to open the interactive list.")
        .arg(
            Arg::new("base_url")
                .long("base-url")
                .value_name("URL")
                .help("Document store base URL (can also be set via TODO_BASE_URL env var)")
                .global(true),
        )
        .subcommand(
            Command::new("todos")
                .about("Task operations")
                .subcommand(Command::new("list").about("List tasks as JSON"))
                .subcommand(
                    Command::new("add").about("Add a task").arg(
                        Arg::new("title")
                            .help("Task title")
                            .required(true)
                            .index(1),
                    ),
                )
                .subcommand(
                    Command::new("toggle")
                        .about("Toggle a task between complete and incomplete")
                        .arg(
                            Arg::new("todo_id")
                                .help("Task ID to toggle")
                                .required(true)
                                .allow_hyphen_values(true)
                                .index(1),
                        ),
                )
                .subcommand(
                    Command::new("delete").about("Delete a task").arg(
                        Arg::new("todo_id")
                            .help("Task ID to delete")
                            .required(true)
                            .allow_hyphen_values(true)
                            .index(1),
                    ),
                ),
        )
}

/// Applies `--base-url`, then `TODO_BASE_URL`, over the loaded config.
/// Returns whether anything changed.
fn apply_overrides(
    config: &mut AppConfig,
    matches: &ArgMatches,
    env_base_url: Option<String>,
) -> bool {
    let base_url = matches
        .get_one::<String>("base_url")
        .cloned()
        .or(env_base_url);

    match base_url {
        Some(url) if url != config.base_url => {
            config.base_url = url;
            true
        }
        _ => false,
    }
}

/// Warns when a create went through but the list could not be reloaded.
fn reload_warning(id: &TodoId, state: &TodoState) -> Option<String> {
    state
        .error
        .then(|| format!("❌ Task {id} created but reload failed; listing may be stale"))
}

fn fail(context: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("❌ {context}: {e}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize color-eyre for better error reporting
    color_eyre::install()?;

    // Log to a file; the terminal belongs to the UI
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("todo-tui.log")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .init();

    let matches = cli().get_matches();

    // Load configuration
    let config_store = FileConfigStore::new()?;
    let mut config = config_store.load_config().await?;

    if apply_overrides(&mut config, &matches, std::env::var("TODO_BASE_URL").ok()) {
        config_store.save_config(&config).await?;
    }

    // Create dependencies
    let client = DocumentStoreClient::new(
        &config.base_url,
        config.request_timeout_secs.map(Duration::from_secs),
    )?;
    tracing::info!("Using document store at {}", client.base_url());
    let repository = Arc::new(RemoteTodoRepository::new(client));
    let store = Arc::new(TodoStore::new(repository));

    match matches.subcommand() {
        Some(("todos", todos_matches)) => match todos_matches.subcommand() {
            Some(("list", _)) => match store.fetch_all().await {
                Ok(todos) => println!("{}", serde_json::to_string_pretty(&todos)?),
                Err(e) => fail("Failed to list tasks", e),
            },
            Some(("add", add_matches)) => {
                let title = add_matches
                    .get_one::<String>("title")
                    .map(String::as_str)
                    .unwrap_or_default();
                let id = match store.add(title).await {
                    Ok(id) => id,
                    Err(e) => fail("Failed to add task", e),
                };
                let state = store.snapshot().await;
                if let Some(warning) = reload_warning(&id, &state) {
                    eprintln!("{warning}");
                }
                println!("{}", serde_json::to_string_pretty(&state.todos)?);
            }
            Some(("toggle", toggle_matches)) => {
                if let Some(id) = toggle_matches.get_one::<String>("todo_id") {
                    match store.toggle(&id.as_str().into()).await {
                        Ok(status) => println!(
                            "{}",
                            serde_json::to_string_pretty(
                                &serde_json::json!({ "id": id, "status": status })
                            )?
                        ),
                        Err(e) => fail("Failed to toggle task", e),
                    }
                }
            }
            Some(("delete", delete_matches)) => {
                if let Some(id) = delete_matches.get_one::<String>("todo_id") {
                    match store.delete(&id.as_str().into()).await {
                        Ok(()) => println!(
                            "{}",
                            serde_json::to_string_pretty(
                                &serde_json::json!({ "id": id, "deleted": true })
                            )?
                        ),
                        Err(e) => fail("Failed to delete task", e),
                    }
                }
            }
            _ => {
                eprintln!("❌ Unknown todos subcommand");
                std::process::exit(1);
            }
        },
        None => {
            // Default behavior - run TUI
            if let Err(e) = run_tui(store).await {
                eprintln!("❌ Application error: {e}");
                std::process::exit(1);
            }
        }
        _ => {
            eprintln!("❌ Unknown command");
            std::process::exit(1);
        }
    }

    Ok(())
}
