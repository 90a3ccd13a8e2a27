//! SheetForge Engine - command line entry point.

use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheetforge_domain::{Actor, ActorId, BarDisplay, Component, Item, ItemId};
use sheetforge_engine::infrastructure::config::EngineConfig;
use sheetforge_engine::infrastructure::ports::ActorRepo;
use sheetforge_engine::use_cases::actor_sheet::RollRequest;
use sheetforge_engine::App;

const USAGE: &str = "Usage: sheetforge-engine <command> [args]

Commands:
  list
  import <actor.json>
  delete <actor-id>
  derive <actor-id>
  roll <actor-id> <roll-key> [--alt] [--quiet]
  adjust <actor-id> <bar-key> <=value|+delta|-delta> [--value]
  attach <actor-id> <items.json>
  detach <actor-id> <item-id>
  insert-row <actor-id> <table>
  delete-row <actor-id> <table> <row-id>
  swap-rows <actor-id> <table> <row-id> <row-id>
  add-columns <actor-id> <table> <columns.json>
  reload <actor-id> [template-id]
  reload-all <template-id>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root so running from `crates/engine` works too.
    load_dotenv_from_repo_root();

    let config = EngineConfig::from_env();

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(
        data_dir = %config.data_dir.display(),
        post_rolls = config.post_rolls,
        "Configuration loaded"
    );

    let app = App::from_config(&config);
    let mut args = std::env::args().skip(1);
    let command = args.next();
    let rest: Vec<String> = args.collect();

    match command.as_deref() {
        Some("list") => list(&app).await,
        Some("import") => import(&app, &rest).await,
        Some("delete") => delete(&app, &rest).await,
        Some("derive") => derive(&app, &rest).await,
        Some("roll") => roll(&app, &rest).await,
        Some("adjust") => adjust(&app, &rest).await,
        Some("attach") => attach(&app, &rest).await,
        Some("detach") => detach(&app, &rest).await,
        Some("insert-row") => insert_row(&app, &rest).await,
        Some("delete-row") => delete_row(&app, &rest).await,
        Some("swap-rows") => swap_rows(&app, &rest).await,
        Some("add-columns") => add_columns(&app, &rest).await,
        Some("reload") => reload(&app, &rest).await,
        Some("reload-all") => reload_all(&app, &rest).await,
        Some(cmd) => anyhow::bail!("Unknown command: {cmd}\n\n{USAGE}"),
        None => anyhow::bail!("{USAGE}"),
    }
}

// =============================================================================
// Commands
// =============================================================================

async fn list(app: &App) -> anyhow::Result<()> {
    for actor in app.actors.list().await? {
        let kind = if actor.is_template() { "template" } else { "character" };
        println!("{}\t{}\t{}", actor.id, kind, actor.name);
    }
    Ok(())
}

async fn import(app: &App, args: &[String]) -> anyhow::Result<()> {
    let [path] = positional::<1>(args, "import <actor.json>")?;
    let actor: Actor = read_json(Path::new(path)).await?;
    app.actors.save(&actor).await?;
    tracing::info!(actor_id = %actor.id, name = %actor.name, "Actor imported");
    println!("{}", actor.id);
    Ok(())
}

async fn delete(app: &App, args: &[String]) -> anyhow::Result<()> {
    let [actor_id] = positional::<1>(args, "delete <actor-id>")?;
    let actor_id = parse_id(actor_id)?;
    app.actors.delete(actor_id).await?;
    tracing::info!(actor_id = %actor_id, "Actor deleted");
    Ok(())
}

async fn derive(app: &App, args: &[String]) -> anyhow::Result<()> {
    let [actor_id] = positional::<1>(args, "derive <actor-id>")?;
    let derived = app
        .use_cases
        .actor_sheet
        .prepare
        .execute(parse_id(actor_id)?)
        .await?;
    print_json(&derived)
}

async fn roll(app: &App, args: &[String]) -> anyhow::Result<()> {
    let [actor_id, key] = positional::<2>(args, "roll <actor-id> <roll-key> [--alt] [--quiet]")?;
    let mut request = RollRequest::new(key.as_str());
    if has_flag(args, "--alt") {
        request = request.alternative();
    }
    if has_flag(args, "--quiet") {
        request = request.quiet();
    }

    let outcome = app
        .use_cases
        .actor_sheet
        .roll
        .execute(parse_id(actor_id)?, request)
        .await?;
    print_json(&outcome.phrase)
}

async fn adjust(app: &App, args: &[String]) -> anyhow::Result<()> {
    let [actor_id, key, input] =
        positional::<3>(args, "adjust <actor-id> <bar-key> <input> [--value]")?;
    let display = if has_flag(args, "--value") {
        BarDisplay::Value
    } else {
        BarDisplay::Bar
    };

    let bar = app
        .use_cases
        .actor_sheet
        .adjust_bar
        .execute(parse_id(actor_id)?, key, input, display)
        .await?;
    print_json(&bar)
}

async fn attach(app: &App, args: &[String]) -> anyhow::Result<()> {
    let [actor_id, path] = positional::<2>(args, "attach <actor-id> <items.json>")?;
    let items: Vec<Item> = read_json(Path::new(path)).await?;
    let attachment = app
        .use_cases
        .actor_sheet
        .attach_items
        .execute(parse_id(actor_id)?, items)
        .await?;
    print_json(&attachment)
}

async fn detach(app: &App, args: &[String]) -> anyhow::Result<()> {
    let [actor_id, item_id] = positional::<2>(args, "detach <actor-id> <item-id>")?;
    let item_id: ItemId = item_id.parse()?;
    let item = app
        .use_cases
        .actor_sheet
        .detach_item
        .execute(parse_id(actor_id)?, item_id)
        .await?;
    print_json(&item)
}

async fn insert_row(app: &App, args: &[String]) -> anyhow::Result<()> {
    let [actor_id, table] = positional::<2>(args, "insert-row <actor-id> <table>")?;
    let row_id = app
        .use_cases
        .actor_sheet
        .rows
        .insert(parse_id(actor_id)?, table)
        .await?;
    println!("{row_id}");
    Ok(())
}

async fn delete_row(app: &App, args: &[String]) -> anyhow::Result<()> {
    let [actor_id, table, row_id] =
        positional::<3>(args, "delete-row <actor-id> <table> <row-id>")?;
    app.use_cases
        .actor_sheet
        .rows
        .delete(parse_id(actor_id)?, table, row_id)
        .await?;
    Ok(())
}

async fn swap_rows(app: &App, args: &[String]) -> anyhow::Result<()> {
    let [actor_id, table, first, second] =
        positional::<4>(args, "swap-rows <actor-id> <table> <row-id> <row-id>")?;
    app.use_cases
        .actor_sheet
        .rows
        .swap(parse_id(actor_id)?, table, first, second)
        .await?;
    Ok(())
}

async fn add_columns(app: &App, args: &[String]) -> anyhow::Result<()> {
    let [actor_id, table, path] =
        positional::<3>(args, "add-columns <actor-id> <table> <columns.json>")?;
    let columns: Vec<Component> = read_json(Path::new(path)).await?;
    app.use_cases
        .template
        .add_columns
        .execute(parse_id(actor_id)?, table, columns)
        .await?;
    Ok(())
}

async fn reload(app: &App, args: &[String]) -> anyhow::Result<()> {
    let (actor_id, template_id) = match positional_args(args).as_slice() {
        [actor_id] => (parse_id(actor_id)?, None),
        [actor_id, template_id] => (parse_id(actor_id)?, Some(parse_id(template_id)?)),
        _ => anyhow::bail!("Usage: sheetforge-engine reload <actor-id> [template-id]"),
    };
    let reload = app
        .use_cases
        .template
        .reload
        .execute(actor_id, template_id)
        .await?;
    print_json(&reload)
}

async fn reload_all(app: &App, args: &[String]) -> anyhow::Result<()> {
    let [template_id] = positional::<1>(args, "reload-all <template-id>")?;
    let reloads = app
        .use_cases
        .template
        .reload
        .reload_all(parse_id(template_id)?)
        .await?;
    print_json(&reloads)
}

// =============================================================================
// Helpers
// =============================================================================

fn positional_args(args: &[String]) -> Vec<&String> {
    args.iter().filter(|arg| !arg.starts_with("--")).collect()
}

/// Exactly `N` non-flag arguments.
fn positional<'a, const N: usize>(args: &'a [String], usage: &str) -> anyhow::Result<[&'a String; N]> {
    let values = positional_args(args);
    if values.len() != N {
        anyhow::bail!("Usage: sheetforge-engine {usage}");
    }
    values
        .try_into()
        .map_err(|_| anyhow::anyhow!("Usage: sheetforge-engine {usage}"))
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn parse_id(value: &str) -> anyhow::Result<ActorId> {
    value
        .parse::<ActorId>()
        .with_context(|| format!("invalid actor id '{value}'"))
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
