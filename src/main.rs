mod cli;
mod config;
mod db;
mod models;
mod prayer_times;
mod tui;
mod utils;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use rusqlite::Connection;
use std::process::ExitCode;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::migrations::run_migrations;
use db::repository::CacheRepo;

fn main() -> Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    run_migrations(&conn)?;

    let pruned = CacheRepo::prune_before(&conn, Local::now().date_naive())?;
    if pruned > 0 {
        log::debug!("Pruned {} stale cached day(s)", pruned);
    }

    match cli.command {
        Some(Commands::Times { location, refresh }) => {
            handlers::handle_times(&conn, &config, &location, refresh)?;
        }
        Some(Commands::Next { location }) => {
            handlers::handle_next(&conn, &config, &location)?;
        }
        Some(Commands::Hijri) => {
            handlers::handle_hijri(&config)?;
        }
        Some(Commands::Bookmark { action }) => {
            if !handlers::handle_bookmark(&conn, &action)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Some(Commands::Settings { action }) => {
            handlers::handle_settings(&mut config, &action)?;
        }
        Some(Commands::Cache { action }) => {
            handlers::handle_cache(&conn, &action)?;
        }

        // No subcommand → launch TUI
        None => {
            tui::app::run(conn, config, db_path)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
