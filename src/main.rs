// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use cert_tracker::{
    expiration_badge, export_json, filter_records, import_text, renewal_note, sort_by_key_name,
    summarize,
    write_export, Config, FilterCriteria, ImportFormat, Record, RecordFields, RecordStore,
    SqliteStorage, Status, EXPORT_FILE_NAME,
};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cert-tracker", version, about = "Track certifications and exams")]
struct Cli {
    /// SQLite file holding the collection
    #[arg(long, global = true, env = "CERT_TRACKER_DB")]
    db: Option<PathBuf>,

    /// Storage key the collection blob is kept under
    #[arg(long, global = true, env = "CERT_TRACKER_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive table (default)
    Tui,
    /// Print the filtered, sorted collection
    List {
        /// Case-insensitive search over name, codes and domain
        #[arg(short, long, default_value = "")]
        query: String,
        /// Restrict to a level (repeatable)
        #[arg(long)]
        level: Vec<String>,
        /// Restrict to a status (repeatable)
        #[arg(long)]
        status: Vec<String>,
        /// name | code | datePassed | expiration
        #[arg(short, long, default_value = "")]
        sort: String,
        #[arg(long)]
        json: bool,
    },
    /// Total and per-status counts
    Summary {
        #[arg(long)]
        json: bool,
    },
    /// Add a record
    Add {
        #[arg(long)]
        name: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Change the supplied fields of a record
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a record by id
    Delete { id: String },
    /// Write the collection as pretty-printed JSON
    Export {
        #[arg(short, long, default_value = EXPORT_FILE_NAME)]
        out: PathBuf,
    },
    /// Import a JSON array or CSV file (stdin when FILE is omitted)
    Import {
        file: Option<PathBuf>,
        /// json | csv (default: from the file extension)
        #[arg(long)]
        format: Option<ImportFormat>,
    },
    /// Clear all data
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct FieldArgs {
    #[arg(long)]
    codes: Option<String>,
    #[arg(long)]
    level: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    date_passed: Option<String>,
    #[arg(long)]
    expiration: Option<String>,
    /// Renewal cadence in months
    #[arg(long)]
    renewal: Option<i64>,
    #[arg(long)]
    domain: Option<String>,
    #[arg(long)]
    source: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

impl FieldArgs {
    /// Overwrite only the fields that were supplied
    fn apply(self, fields: &mut RecordFields) {
        let FieldArgs { codes, level, status, date_passed, expiration, renewal, domain, source, notes } = self;

        let text = [
            (codes, &mut fields.codes),
            (level, &mut fields.level),
            (status, &mut fields.status),
            (date_passed, &mut fields.date_passed),
            (expiration, &mut fields.expiration),
            (domain, &mut fields.domain),
            (source, &mut fields.source),
            (notes, &mut fields.notes),
        ];
        for (value, slot) in text {
            if let Some(value) = value {
                *slot = value;
            }
        }

        if let Some(renewal) = renewal {
            fields.renewal = renewal;
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let config = Config::resolve(cli.db.clone(), cli.key.clone());

    let command = cli.command.unwrap_or(Command::Tui);

    let log_file = matches!(command, Command::Tui).then_some(config.log_path.as_path());
    init_logging(log_file);

    if let Err(e) = run(&config, command) {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr, or to `log_file` when the terminal is taken by the TUI
fn init_logging(log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file = log_file.and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn open_store(config: &Config) -> Result<RecordStore<SqliteStorage>> {
    let storage = SqliteStorage::open(&config.db_path)
        .with_context(|| format!("Failed to open tracker database: {}", config.db_path.display()))?;
    Ok(RecordStore::open_with_key(storage, &config.storage_key))
}

fn run(config: &Config, command: Command) -> Result<()> {
    let mut store = open_store(config)?;

    match command {
        Command::Tui => run_ui_mode(store)?,
        Command::List { query, level, status, sort, json } => {
            let criteria = FilterCriteria { query, levels: level, statuses: status };
            let records = sort_by_key_name(filter_records(store.list(), &criteria), &sort);

            if json {
                println!("{}", export_json(&records)?);
            } else {
                print_table(&records);
                println!("\n{} of {} records", records.len(), store.len());
            }
        }
        Command::Summary { json } => {
            let summary = summarize(store.list());
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Total:    {}", summary.total);
                for status in Status::ALL {
                    println!("{:<17} {}", format!("{}:", status), summary.count(status));
                }

                match store.storage().updated_at(store.storage_key())? {
                    Some(updated) => println!("\nLast saved: {}", updated),
                    None => println!("\nNot saved yet (showing example data)"),
                }
            }
        }
        Command::Add { name, fields } => {
            let mut draft = RecordFields::named(&name);
            fields.apply(&mut draft);

            let record = store.create(draft.trimmed())?;
            println!("✓ Added {} ({})", record.name, record.id);
        }
        Command::Edit { id, name, fields } => {
            let mut draft = store.begin_edit(&id)?;
            if let Some(name) = name {
                draft.name = name;
            }
            fields.apply(&mut draft);

            let record = store.save_draft(draft.trimmed())?;
            println!("✓ Updated {} ({})", record.name, record.id);
        }
        Command::Delete { id } => {
            if store.delete(&id)? {
                println!("✓ Deleted {}", id);
            } else {
                println!("Nothing to delete: {}", id);
            }
        }
        Command::Export { out } => {
            let path = write_export(store.list(), &out)?;
            println!("✓ Exported {} records to {}", store.len(), path.display());
        }
        Command::Import { file, format } => {
            let text = match &file {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read import file: {}", path.display()))?,
                None => {
                    let mut text = String::new();
                    std::io::stdin()
                        .read_to_string(&mut text)
                        .context("Failed to read import from stdin")?;
                    text
                }
            };
            let format = format.unwrap_or_else(|| match &file {
                Some(path) => ImportFormat::from_path(path),
                None => ImportFormat::Json,
            });

            let summary = import_text(&mut store, &text, format)?;
            println!("✓ Imported {} records", summary.imported);
            if summary.skipped > 0 {
                println!("  {} rows without a name skipped", summary.skipped);
            }
        }
        Command::Reset { yes } => {
            if !yes {
                bail!("reset clears all data; re-run with --yes to confirm");
            }
            store.clear()?;
            println!("✓ All data cleared");
        }
    }

    Ok(())
}

fn print_table(records: &[Record]) {
    println!(
        "{:<36}  {:<12}  {:<40}  {:<10}  {:<16}  {:<10}  {:<10}  {:<18}  {}",
        "ID", "Level", "Name", "Code(s)", "Status", "Passed", "Expires", "Left", "Renewal"
    );
    println!("{}", "━".repeat(190));

    for record in records {
        let badge = expiration_badge(record)
            .map(|b| format!("{} [{}]", b.label, b.severity.as_str()))
            .unwrap_or_default();

        println!(
            "{:<36}  {:<12}  {:<40}  {:<10}  {:<16}  {:<10}  {:<10}  {:<18}  {}",
            record.id,
            record.level,
            record.name,
            record.codes,
            record.status,
            record.date_passed,
            record.expiration,
            badge,
            renewal_note(record)
        );
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(store: RecordStore<SqliteStorage>) -> Result<()> {
    let export_dir = std::env::current_dir().context("Failed to resolve working directory")?;

    let mut app = ui::App::new(store, export_dir);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_store: RecordStore<SqliteStorage>) -> Result<()> {
    bail!("TUI mode not available; rebuild with `--features tui` or use a subcommand (see --help)")
}
