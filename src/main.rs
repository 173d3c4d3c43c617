// src/main.rs
//
// galleryhub command-line front end.
// Every command prints pretty JSON; failures exit non-zero.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use env_logger::Builder;
use log::LevelFilter;
use serde::Serialize;
use serde_json::{Map, Value};

use galleryhub::application::commands::*;
use galleryhub::application::state::AppState;
use galleryhub::application::ErrorResponse;
use galleryhub::config::{self, AppConfig};
use galleryhub::db::{
    create_connection_pool, get_database_stats, initialize_database, verify_database_integrity,
};
use galleryhub::events::{GalleryCreated, GalleryDeleted, GalleryUpdated};
use galleryhub::services::{ListRules, COUNT_PARAM, ORDER_BY_PARAM, PAGE_PARAM};

const USAGE: &str = "\
galleryhub - ordered media galleries over SQLite

USAGE:
  galleryhub [--config PATH] <COMMAND> [ARGS]

COMMANDS:
  list [--page N] [--count N] [--enabled 0|1] [--order FIELD:DIR]... [--filter KEY=VALUE]...
  get ID
  media ID
  associations ID
  create JSON
  update ID JSON
  delete ID
  stats
";

fn init_logger(config: &AppConfig) {
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
        return;
    }

    let level = config.log_level.parse().unwrap_or(LevelFilter::Info);
    Builder::new().filter_level(level).init();
}

fn main() -> anyhow::Result<()> {
    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        print!("{}", USAGE);
        return Ok(());
    }

    // 1. CONFIGURATION & LOGGING
    let config_path: Option<PathBuf> = args.opt_value_from_str("--config")?;
    let config = match config_path {
        Some(path) => config::load_from_path(&path)?,
        None => config::load()?,
    };
    init_logger(&config);

    // 2. INFRASTRUCTURE
    let pool = Arc::new(create_connection_pool(&config)?);
    {
        let conn = pool.get()?;
        initialize_database(&conn)?;
    }

    // 3. SERVICES & STATE
    let state = AppState::from_pool(pool.clone(), ListRules::from_config(&config));

    // 4. EVENT HANDLER REGISTRATION
    state.event_bus.subscribe::<GalleryCreated, _>(|event| {
        log::debug!("event: gallery {} created ({})", event.gallery_id, event.name);
    });
    state.event_bus.subscribe::<GalleryUpdated, _>(|event| {
        log::debug!("event: gallery {} updated", event.gallery_id);
    });
    state.event_bus.subscribe::<GalleryDeleted, _>(|event| {
        log::debug!("event: gallery {} deleted", event.gallery_id);
    });

    // 5. DISPATCH
    let command: Option<String> = args.subcommand()?;
    let outcome = match command.as_deref() {
        Some("list") => {
            let params = list_params(&mut args)?;
            finish(args)?;
            render(list_galleries(&state, Value::Object(params)))?
        }
        Some("get") => {
            let id = args.free_from_str().context("get needs a gallery id")?;
            finish(args)?;
            render(get_gallery(&state, id))?
        }
        Some("media") => {
            let id = args.free_from_str().context("media needs a gallery id")?;
            finish(args)?;
            render(get_gallery_media(&state, id))?
        }
        Some("associations") => {
            let id = args.free_from_str().context("associations needs a gallery id")?;
            finish(args)?;
            render(get_gallery_associations(&state, id))?
        }
        Some("create") => {
            let payload = json_arg(&mut args)?;
            finish(args)?;
            render(create_gallery(&state, payload))?
        }
        Some("update") => {
            let id = args.free_from_str().context("update needs a gallery id")?;
            let payload = json_arg(&mut args)?;
            finish(args)?;
            render(update_gallery(&state, id, payload))?
        }
        Some("delete") => {
            let id = args.free_from_str().context("delete needs a gallery id")?;
            finish(args)?;
            render(delete_gallery(&state, id))?
        }
        Some("stats") => {
            finish(args)?;
            let conn = pool.get()?;
            verify_database_integrity(&conn)?;
            Ok(serde_json::to_value(get_database_stats(&conn)?)?)
        }
        Some(other) => bail!("unknown command '{}'\n\n{}", other, USAGE),
        None => bail!("missing command\n\n{}", USAGE),
    };

    match outcome {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            std::process::exit(1);
        }
    }
}

/// Gather listing flags into the raw parameter map the service parses
fn list_params(args: &mut pico_args::Arguments) -> anyhow::Result<Map<String, Value>> {
    let mut params = Map::new();

    if let Some(page) = args.opt_value_from_str::<_, String>("--page")? {
        params.insert(PAGE_PARAM.to_string(), Value::String(page));
    }
    if let Some(count) = args.opt_value_from_str::<_, String>("--count")? {
        params.insert(COUNT_PARAM.to_string(), Value::String(count));
    }
    if let Some(enabled) = args.opt_value_from_str::<_, String>("--enabled")? {
        params.insert("enabled".to_string(), Value::String(enabled));
    }

    let mut order = Map::new();
    for term in args.values_from_str::<_, String>("--order")? {
        let (field, direction) = term.split_once(':').unwrap_or((term.as_str(), "ASC"));
        order.insert(field.to_string(), Value::String(direction.to_string()));
    }
    if !order.is_empty() {
        params.insert(ORDER_BY_PARAM.to_string(), Value::Object(order));
    }

    for filter in args.values_from_str::<_, String>("--filter")? {
        let Some((key, value)) = filter.split_once('=') else {
            bail!("--filter expects KEY=VALUE, got '{}'", filter);
        };
        let value = Value::String(value.to_string());

        // Repeating a key filters on any of the given values
        match params.get_mut(key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                params.insert(key.to_string(), value);
            }
        }
    }

    Ok(params)
}

fn json_arg(args: &mut pico_args::Arguments) -> anyhow::Result<Value> {
    let raw: String = args.free_from_str().context("expected a JSON payload")?;
    serde_json::from_str(&raw).context("payload is not valid JSON")
}

fn finish(args: pico_args::Arguments) -> anyhow::Result<()> {
    let rest = args.finish();
    if !rest.is_empty() {
        bail!("unexpected arguments: {:?}", rest);
    }
    Ok(())
}

fn render<T: Serialize>(
    result: Result<T, ErrorResponse>,
) -> anyhow::Result<Result<Value, ErrorResponse>> {
    match result {
        Ok(value) => Ok(Ok(serde_json::to_value(value)?)),
        Err(response) => Ok(Err(response)),
    }
}
