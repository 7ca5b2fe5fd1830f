use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use reelkeep::app::MovieApp;
use reelkeep::input;
use reelkeep::lookup::OmdbClient;
use reelkeep::render;
use reelkeep::storage::{
    Config, ConfigStorage, StorageKind, TomlConfigStorage, ensure_directories,
};
use reelkeep::users::UserRegistry;

#[derive(Parser)]
#[command(name = "reelkeep")]
#[command(about = "Terminal movie collection tracker", long_about = None)]
struct Cli {
    /// Override the data directory (default: XDG data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

const MENU: &str = "\tOPERATIONS
1. List movies
2. Add movie
3. Delete movie
4. Update movie
5. Sort movies
6. Movie stats
7. Generate webpage
8. Exit";

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    let (default_data_dir, config_dir) = ensure_directories()?;
    let data_dir = cli.data_dir.unwrap_or(default_data_dir);
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let config_storage = TomlConfigStorage::new(config_dir.join("reelkeep.toml"));
    let config = config_storage.load()?;

    run_shell(&data_dir, &config)
}

/// Sign-in flow, storage selection, then the operation loop. Only a failed
/// sign-in terminates; every error inside the loop is printed and the
/// session continues.
fn run_shell(data_dir: &PathBuf, config: &Config) -> Result<()> {
    let registry = UserRegistry::new(data_dir.clone());
    let username = sign_in(&registry)?;

    let kind = read_storage_kind()?;
    let storage = kind.open(&registry.collection_stem(&username))?;

    let app = MovieApp::new(storage);
    log::info!(
        "Opened {:?} collection at {:?}",
        username,
        app.storage_path()
    );
    let lookup = OmdbClient::new(config.lookup.clone())?;

    loop {
        let command = input::read_int_ranged(&format!("{MENU}\nChosen command: "), 1, 8)?;
        let outcome = match command {
            1 => cmd_list(&app),
            2 => cmd_add(&app, &lookup),
            3 => cmd_delete(&app),
            4 => cmd_update(&app),
            5 => cmd_sort(&app),
            6 => cmd_stats(&app),
            7 => cmd_generate_page(&app, &registry, &username, config),
            _ => break,
        };
        match outcome {
            Ok(message) => println!("\n{message}\n"),
            Err(error) => println!("\n{error}\n"),
        }
    }

    Ok(())
}

/// Verify an existing account or register a new one. Aborts the program
/// on a failed sign-in, matching the rest of the session being useless
/// without one.
fn sign_in(registry: &UserRegistry) -> Result<String> {
    if input::ask_to_continue("Have you registered before? (y/n): ")? {
        let username = input::read_text("Username: ")?;
        let password = input::read_text("Password: ")?;
        let username = registry.verify(&username, &password)?;
        println!("Signed in as {username}");
        return Ok(username);
    }

    if input::ask_to_continue("Create a new account? (y/n): ")? {
        let username = input::read_text("Username: ")?;
        let password = input::read_text("Password: ")?;
        let username = registry.register(&username, &password)?;
        println!("Account created for {username}");
        return Ok(username);
    }

    bail!("Sign-in aborted");
}

fn read_storage_kind() -> Result<StorageKind> {
    loop {
        let entered = input::read_text("Storage format (json/csv): ")?;
        match StorageKind::parse(&entered) {
            Some(kind) => return Ok(kind),
            None => println!("Unknown format {entered:?}, expected json or csv"),
        }
    }
}

fn cmd_list(app: &MovieApp) -> Result<String> {
    let catalog = app.list_movies()?;
    Ok(render::render_listing(&catalog))
}

fn cmd_add(app: &MovieApp, lookup: &OmdbClient) -> Result<String> {
    let name = input::read_text("Enter movie name: ")?;
    let (title, movie) = lookup.lookup(&name)?;
    let stored = app.add_movie(&title, movie)?;
    Ok(format!("Movie {stored} added successfully"))
}

fn cmd_delete(app: &MovieApp) -> Result<String> {
    let name = input::read_text("Enter movie name: ")?;
    let deleted = app.delete_movie(&name)?;
    Ok(format!("Movie {deleted} deleted successfully"))
}

fn cmd_update(app: &MovieApp) -> Result<String> {
    let name = input::read_text("Enter movie name: ")?;
    let rating = input::read_float("Enter a new rating: ")?;
    let updated = app.update_movie(&name, rating)?;
    Ok(format!("Movie {updated} updated successfully"))
}

fn cmd_sort(app: &MovieApp) -> Result<String> {
    let direction = input::read_text("Enter the order of sorting (asc/desc): ")?;
    let entries = app.sort_movies(&direction)?;
    Ok(render::render_entries(
        entries.iter().map(|(title, movie)| (title.as_str(), movie)),
    ))
}

fn cmd_stats(app: &MovieApp) -> Result<String> {
    let stats = app.stat_movies()?;
    Ok(render::render_stats(&stats))
}

fn cmd_generate_page(
    app: &MovieApp,
    registry: &UserRegistry,
    username: &str,
    config: &Config,
) -> Result<String> {
    let catalog = app.list_movies()?;
    let page = render::render_page(
        &catalog,
        &config.general.page_heading,
        &config.general.page_owner,
    );

    let path = registry.page_path(username);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create site directory {:?}", parent))?;
    }
    fs::write(&path, page)
        .with_context(|| format!("Failed to write web page to {:?}", path))?;

    log::info!("Generated web page for {:?} at {:?}", username, path);
    Ok(format!("Web page written to {}", path.display()))
}
