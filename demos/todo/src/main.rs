//! Command-line demo for the todo store.
//!
//! Without arguments it runs a scripted session. With `--actions` it replays
//! a file of JSON actions, one per line.

use anyhow::Context;
use clap::Parser;
use statestore_core::SequentialIdGenerator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use todo::actions::{add_todo, set_visibility_filter, toggle_todo};
use todo::selectors::{self, TodoCounts};
use todo::{Todo, TodoId, TodoStore, VisibilityFilter, dispatch_json, new_store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Replay todo actions through a StateStore
#[derive(Debug, Parser)]
#[command(name = "todo", version, about)]
struct Args {
    /// File of JSON actions, one per line (e.g. {"type":"ADD_TODO","id":0,"text":"Learn"})
    #[arg(long)]
    actions: Option<PathBuf>,

    /// Visibility filter used for the final listing (SHOW_ALL, SHOW_ACTIVE, SHOW_COMPLETED)
    #[arg(long)]
    filter: Option<String>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo=info,statestore_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn print_todos(title: &str, todos: &[Arc<Todo>]) {
    println!("\n{title}");
    for todo in todos {
        let status = if todo.completed { "✓" } else { " " };
        println!("  [{status}] {} {}", todo.id, todo.text);
    }
}

fn run_script(store: &TodoStore) -> anyhow::Result<()> {
    let ids = SequentialIdGenerator::new();

    println!("Adding todos...");
    for text in ["Learn reducers", "Compose reducers", "Ship it"] {
        store.dispatch(add_todo(&ids, text))?;
    }

    println!("\nToggling todo 1...");
    store.dispatch(toggle_todo(TodoId::new(1)))?;

    println!("\nShowing active todos...");
    store.dispatch(set_visibility_filter(VisibilityFilter::ShowActive))?;

    Ok(())
}

fn replay(store: &TodoStore, path: &Path) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read actions from {}", path.display()))?;

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Err(error) = dispatch_json(store, line) {
            tracing::warn!(line = index + 1, error = %error, "Skipping action");
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    statestore_runtime::metrics::describe_metrics();
    let args = Args::parse();

    println!("=== Todo Store ===\n");

    let store = new_store();

    let _counts = store.connect(selectors::counts, |counts: &TodoCounts| {
        println!(
            "  counts: {} total, {} active, {} completed",
            counts.total, counts.active, counts.completed
        );
    });

    match &args.actions {
        Some(path) => replay(&store, path)?,
        None => run_script(&store)?,
    }

    let state = store.get_state();
    let filter = match &args.filter {
        Some(name) => name.parse()?,
        None => state.visibility_filter,
    };
    print_todos(
        &format!("Visible todos ({filter}):"),
        &selectors::select_visible_todos(&state.todos, filter),
    );

    println!("\nFinal state:\n{}", serde_json::to_string_pretty(&*state)?);

    store.shutdown();
    println!("\n=== Done ===");
    Ok(())
}
