//! Command-line interface for the sync tool.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{SyncConfig, TEXT_WRAP_WIDTH};
use crate::error::{Result, SyncError};
use crate::service::{ingest_file, lookup_update};
use crate::storage::{MemoryStore, UpdateStore, YamlStore};
use crate::types::{Project, Update};

/// Number of warnings printed after an ingest run.
const SHOWN_WARNINGS: usize = 10;

/// RSR Up sync - Ingest Akvo RSR project update feeds into local storage.
#[derive(Parser)]
#[command(name = "rsr-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse an update list feed and store every update in it.
    Ingest {
        /// Feed XML file
        feed: PathBuf,

        /// Store directory (default: $RSR_STORE_DIR or ./rsr-data)
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// The feed was requested with photo and video metadata
        #[arg(long)]
        extended: bool,
    },

    /// Parse a feed without storing it and print its last update.
    Lookup {
        /// Feed XML file
        feed: PathBuf,
    },

    /// Show a stored update with its project.
    ShowUpdate {
        /// Update id
        id: String,

        /// Store directory (default: $RSR_STORE_DIR or ./rsr-data)
        #[arg(short, long)]
        store: Option<PathBuf>,
    },

    /// Add or replace a project in the store.
    AddProject {
        /// Project id
        id: String,

        /// Project title
        title: String,

        /// Store directory (default: $RSR_STORE_DIR or ./rsr-data)
        #[arg(short, long)]
        store: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest {
            feed,
            store,
            extended,
        } => ingest_command(&feed, store.as_deref(), extended),
        Commands::Lookup { feed } => lookup_command(&feed),
        Commands::ShowUpdate { id, store } => show_update_command(&id, store.as_deref()),
        Commands::AddProject { id, title, store } => {
            add_project_command(&id, &title, store.as_deref())
        }
    }
}

/// Execute the ingest command.
fn ingest_command(feed: &Path, store_dir: Option<&Path>, extended: bool) -> Result<()> {
    let config = SyncConfig::from_env()?
        .with_store_dir(store_dir)
        .with_extended_fields(extended);

    // Validate the feed before touching the store
    if !feed.is_file() {
        return Err(SyncError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Feed file does not exist: {}", feed.display()),
        )));
    }

    println!(
        "{} {} into {}",
        style("Ingesting").bold(),
        style(feed.display()).cyan(),
        style(config.store_dir.display()).green()
    );
    println!();

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Parsing updates...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let mut store = YamlStore::new(&config.store_dir);
    let report = match ingest_file(feed, &mut store, config.extended_fields) {
        Ok(report) => report,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    println!("  Objects: {}", report.objects_seen());
    println!("  Stored updates: {}", style(report.success_count()).green());
    if report.had_error() {
        println!(
            "  Warnings: {}",
            style(report.warning_count()).yellow().bold()
        );
        for warning in report.warnings().iter().take(SHOWN_WARNINGS) {
            println!("    {} {warning}", style("-").yellow());
        }
        if report.warning_count() > SHOWN_WARNINGS {
            println!(
                "    ... and {} more",
                report.warning_count() - SHOWN_WARNINGS
            );
        }
    }

    Ok(())
}

/// Execute the lookup command.
fn lookup_command(feed: &Path) -> Result<()> {
    let file = std::fs::File::open(feed)?;
    let mut store = MemoryStore::new();

    match lookup_update(std::io::BufReader::new(file), &mut store)? {
        Some(update) => {
            print_update(&update, None);
            Ok(())
        }
        None => {
            println!("{}", style("No update with an id in feed").yellow());
            Ok(())
        }
    }
}

/// Execute the show-update command.
fn show_update_command(id: &str, store_dir: Option<&Path>) -> Result<()> {
    let config = SyncConfig::from_env()?.with_store_dir(store_dir);
    let mut store = YamlStore::new(&config.store_dir);
    store.open()?;

    let found = find_update_with_project(&store, id);
    store.close()?;

    let (update, project) = found?;
    print_update(&update, project.as_ref());
    Ok(())
}

fn find_update_with_project(store: &YamlStore, id: &str) -> Result<(Update, Option<Project>)> {
    let update = store
        .find_update(id)?
        .ok_or_else(|| SyncError::RecordNotFound {
            kind: "Update",
            id: id.to_string(),
        })?;

    let project = match update.project_id.as_deref() {
        Some(project_id) => store.find_project(project_id)?,
        None => None,
    };

    Ok((update, project))
}

/// Execute the add-project command.
fn add_project_command(id: &str, title: &str, store_dir: Option<&Path>) -> Result<()> {
    let config = SyncConfig::from_env()?.with_store_dir(store_dir);
    let mut store = YamlStore::new(&config.store_dir);
    store.open()?;

    let saved = store.save_project(&Project::new(id, title));
    store.close()?;
    saved?;

    println!(
        "{} project {} ({})",
        style("Saved").green().bold(),
        style(id).cyan(),
        title
    );
    Ok(())
}

fn print_update(update: &Update, project: Option<&Project>) {
    let project_title = match (project, update.project_id.as_deref()) {
        (Some(project), _) => project.title.clone(),
        (None, Some(project_id)) => format!("project {project_id}"),
        (None, None) => "<NO PROJECT ID>".to_string(),
    };

    println!("{}", style(&project_title).bold());
    println!("  Update: {} ({})", style(&update.title).green(), update.id);
    if let Some(date) = update.date {
        println!("  Date: {}", date.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(user_id) = update.user_id.as_deref() {
        println!("  User: {user_id}");
    }
    println!(
        "  Editable: {}",
        if update.is_editable() { "yes" } else { "no" }
    );
    if let Some(file) = update.thumbnail_filename.as_deref() {
        println!("  Photo: {file}");
    } else if let Some(url) = update.thumbnail_url.as_deref().filter(|u| !u.is_empty()) {
        println!("  Photo: {url}");
    }

    if !update.text.is_empty() {
        println!();
        println!("{}", textwrap::fill(&update.text, TEXT_WRAP_WIDTH));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_ingest() {
        let cli = Cli::parse_from(["rsr-sync", "ingest", "feed.xml"]);

        let Commands::Ingest {
            feed,
            store,
            extended,
        } = cli.command
        else {
            panic!("expected ingest command");
        };
        assert_eq!(feed, PathBuf::from("feed.xml"));
        assert!(store.is_none());
        assert!(!extended);
    }

    #[test]
    fn test_cli_parse_ingest_with_options() {
        let cli = Cli::parse_from([
            "rsr-sync",
            "ingest",
            "feed.xml",
            "--store",
            "/tmp/rsr",
            "--extended",
        ]);

        let Commands::Ingest {
            store, extended, ..
        } = cli.command
        else {
            panic!("expected ingest command");
        };
        assert_eq!(store, Some(PathBuf::from("/tmp/rsr")));
        assert!(extended);
    }

    #[test]
    fn test_cli_parse_show_update() {
        let cli = Cli::parse_from(["rsr-sync", "show-update", "2505", "-s", "data"]);

        let Commands::ShowUpdate { id, store } = cli.command else {
            panic!("expected show-update command");
        };
        assert_eq!(id, "2505");
        assert_eq!(store, Some(PathBuf::from("data")));
    }

    #[test]
    fn test_cli_parse_add_project() {
        let cli = Cli::parse_from(["rsr-sync", "add-project", "363", "Video screening"]);

        let Commands::AddProject { id, title, .. } = cli.command else {
            panic!("expected add-project command");
        };
        assert_eq!(id, "363");
        assert_eq!(title, "Video screening");
    }
}
