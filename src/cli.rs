use std::{fs, path::PathBuf, process};

mod list;
mod terminal;

use clap::ArgAction;
use list::List;
use relcheck::{ChecklistDocument, Config, LoadSource, Os, Store, export_csv};
use terminal::Colorize;
use tracing::instrument;

/// Name of the optional configuration file, looked up in the working
/// directory.
const CONFIG_FILE: &str = "relcheck.toml";

/// Parse an OS name from a string.
///
/// This is a CLI boundary function; matching is case-insensitive.
fn parse_os(s: &str) -> Result<Os, String> {
    s.parse().map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path of the checklist storage file (overrides the config file)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = load_config();
        let store = Store::new(self.file.unwrap_or_else(|| config.file.clone()));

        self.command
            .unwrap_or_else(|| Command::List(List::default()))
            .run(&store, &config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn load_config() -> Config {
    let path = PathBuf::from(CONFIG_FILE);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

/// Loads the document, surfacing a recovered-parse warning inline.
fn load_document(store: &Store, config: &Config) -> anyhow::Result<ChecklistDocument> {
    let outcome = store.load(&config.default_product)?;
    if let LoadSource::Recovered(e) = &outcome.source {
        eprintln!(
            "{}",
            format!(
                "⚠️  {} is not valid JSON ({e}); starting from an empty checklist",
                store.path().display()
            )
            .warning()
        );
    }
    Ok(outcome.document)
}

/// The (product, OS) bucket a command operates on.
#[derive(Debug, Default, clap::Args)]
pub struct Selection {
    /// The product whose checklist to operate on
    #[arg(long, short)]
    pub product: Option<String>,

    /// The operating system bucket (windows or linux)
    #[arg(long, short, value_parser = parse_os)]
    pub os: Option<Os>,
}

impl Selection {
    fn resolve(&self, config: &Config) -> (String, Os) {
        let product = self
            .product
            .clone()
            .unwrap_or_else(|| config.default_product.clone());
        let os = self.os.unwrap_or(config.default_os);
        (product, os)
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// List checklist items (default)
    List(List),

    /// Initialize an empty checklist file
    Init(Init),

    /// Add a checklist item
    Add(Add),

    /// Edit the item at an index shown by 'list'
    Edit(Edit),

    /// Delete a checklist item by name
    Delete(Delete),

    /// Export the whole checklist as CSV
    Export(Export),
}

impl Command {
    fn run(self, store: &Store, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::List(command) => command.run(store, config)?,
            Self::Init(command) => command.run(store, config)?,
            Self::Add(command) => command.run(store, config)?,
            Self::Edit(command) => command.run(store, config)?,
            Self::Delete(command) => command.run(store, config)?,
            Self::Export(command) => command.run(store, config)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument(skip_all)]
    fn run(self, store: &Store, config: &Config) -> anyhow::Result<()> {
        if store.path().exists() {
            anyhow::bail!(
                "checklist file already exists at {}",
                store.path().display()
            );
        }

        store.save(&ChecklistDocument::skeleton(&config.default_product))?;

        println!("Initialized empty checklist in {}", store.path().display());
        println!();
        println!("Next steps:");
        println!("  relcheck add \"Your first item\" --task-id TASK-001");
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Add {
    /// The checklist item name
    pub name: String,

    /// Tracker task ID (optional), e.g. TASK-031
    #[arg(long, short, value_name = "ID")]
    pub task_id: Option<String>,

    /// Validation steps or notes (optional)
    #[arg(long, short)]
    pub description: Option<String>,

    /// Mark the item's validation as automated (manual otherwise)
    #[arg(long, short)]
    pub automated: bool,

    #[command(flatten)]
    pub selection: Selection,
}

impl Add {
    #[instrument(skip_all)]
    fn run(self, store: &Store, config: &Config) -> anyhow::Result<()> {
        let (product, os) = self.selection.resolve(config);
        let mut document = load_document(store, config)?;

        let bucket = document.ensure_product(&product).bucket_mut(os);
        let added = bucket.add_item(
            &self.name,
            self.task_id.as_deref().unwrap_or(""),
            self.description.as_deref().unwrap_or(""),
            self.automated,
        );

        match added {
            Ok(()) => {
                store.save(&document)?;
                println!(
                    "{}",
                    format!("✅ Added '{}' to {product}/{os}", self.name.trim()).success()
                );
                Ok(())
            }
            Err(e) => {
                eprintln!("{}", format!("⚠️  {e}").warning());
                process::exit(1);
            }
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// Zero-based index of the item to edit, as shown by 'relcheck list'
    pub index: usize,

    /// New item name (keeps the current name when omitted or blank)
    #[arg(long, short)]
    pub name: Option<String>,

    /// New tracker task ID (keeps the current one when omitted)
    #[arg(long, short, value_name = "ID")]
    pub task_id: Option<String>,

    /// New description (keeps the current one when omitted)
    #[arg(long, short)]
    pub description: Option<String>,

    /// New automated flag (keeps the current one when omitted)
    #[arg(long, short, value_name = "BOOL")]
    pub automated: Option<bool>,

    #[command(flatten)]
    pub selection: Selection,
}

impl Edit {
    #[instrument(skip_all)]
    fn run(self, store: &Store, config: &Config) -> anyhow::Result<()> {
        let (product, os) = self.selection.resolve(config);
        let mut document = load_document(store, config)?;

        let bucket = document.ensure_product(&product).bucket_mut(os);

        // Resolve the index against the current list before touching the
        // engine; a stale index is a caller error, not a bucket state.
        let Some(current) = bucket.entry(self.index) else {
            anyhow::bail!(
                "no item at index {} in {product}/{os} ({} items)",
                self.index,
                bucket.len()
            );
        };

        let new_name = self.name.clone().unwrap_or_default();
        let new_task_id = self
            .task_id
            .clone()
            .unwrap_or_else(|| current.task_id.to_string());
        let new_description = self
            .description
            .clone()
            .unwrap_or_else(|| current.description.to_string());
        let new_automated = self.automated.unwrap_or(current.automated);

        let edited = bucket.edit_item(
            self.index,
            &new_name,
            &new_task_id,
            &new_description,
            new_automated,
        );

        match edited {
            Ok(()) => {
                let name = bucket
                    .entry(self.index)
                    .map_or_else(String::new, |entry| entry.name.to_string());
                store.save(&document)?;
                println!("{}", format!("✅ Updated '{name}'").success());
                Ok(())
            }
            Err(e) => {
                eprintln!("{}", format!("⚠️  {e}").warning());
                process::exit(1);
            }
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// The name of the item to delete
    pub name: String,

    #[command(flatten)]
    pub selection: Selection,
}

impl Delete {
    #[instrument(skip_all)]
    fn run(self, store: &Store, config: &Config) -> anyhow::Result<()> {
        let (product, os) = self.selection.resolve(config);
        let mut document = load_document(store, config)?;

        let removed = document
            .ensure_product(&product)
            .bucket_mut(os)
            .delete_item(&self.name);

        if removed {
            store.save(&document)?;
            println!(
                "{}",
                format!("✅ Deleted '{}' from {product}/{os}", self.name).success()
            );
        } else {
            println!(
                "{}",
                format!("'{}' not found in {product}/{os}; nothing deleted", self.name).dim()
            );
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Export {
    /// Write the CSV to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl Export {
    #[instrument(skip_all)]
    fn run(self, store: &Store, config: &Config) -> anyhow::Result<()> {
        let document = load_document(store, config)?;
        let csv = export_csv(&document);

        match self.output {
            Some(path) => {
                fs::write(&path, &csv)?;
                let rows = csv.lines().count().saturating_sub(1);
                println!(
                    "{}",
                    format!("✅ Exported {rows} rows to {}", path.display()).success()
                );
            }
            None => print!("{csv}"),
        }
        Ok(())
    }
}
