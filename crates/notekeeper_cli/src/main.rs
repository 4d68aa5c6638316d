//! Command-line front end over `notekeeper_core`.
//!
//! # Responsibility
//! - Open the SQLite-backed note store and run one command against it.
//! - Print notes in a stable, line-oriented format for quick local checks.

use clap::{Args, Parser, Subcommand};
use notekeeper_core::config::{DB_PATH_ENV, DEFAULT_DB_FILE_NAME};
use notekeeper_core::{
    default_log_level, init_logging, GeoPoint, Note, NoteInput, NoteStore, SqliteKvBackend,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "notekeeper", version, about = "Local notes with search")]
struct Cli {
    /// SQLite database file holding the notes slot.
    #[arg(long, env = DB_PATH_ENV, default_value = DEFAULT_DB_FILE_NAME)]
    db: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long)]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all notes in insertion order.
    List,
    /// Create a note.
    Add(AddArgs),
    /// Show one note with its attachments.
    Show { id: String },
    /// Edit title and/or content of a note.
    Edit(EditArgs),
    /// Delete a note. Unknown ids are ignored.
    Remove { id: String },
    /// Case-insensitive search over titles and contents.
    Search { term: String },
    /// Print the text that would be shared for a note.
    Share { id: String },
}

#[derive(Debug, Args)]
struct AddArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    content: String,
    #[arg(long)]
    audio: Option<String>,
    #[arg(long)]
    image: Option<String>,
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
}

#[derive(Debug, Args)]
struct EditArgs {
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    content: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: {err}");
        }
    }

    let backend = match SqliteKvBackend::open(&cli.db) {
        Ok(backend) => backend,
        Err(err) => {
            eprintln!("error: cannot open `{}`: {err}", cli.db.display());
            return ExitCode::FAILURE;
        }
    };
    let store = NoteStore::load(backend);
    if let Some(err) = store.load_error() {
        eprintln!("warning: starting with an empty list: {err}");
    }

    let code = run(&store, cli.command);
    if let Some(err) = store.last_persist_error() {
        eprintln!("warning: changes were not saved: {err}");
    }
    code
}

fn run(store: &NoteStore<SqliteKvBackend>, command: Command) -> ExitCode {
    match command {
        Command::List => {
            store.list().iter().for_each(print_summary);
            ExitCode::SUCCESS
        }
        Command::Add(args) => {
            let mut input = NoteInput::new(args.title, args.content);
            input.audio_uri = args.audio;
            input.image_uri = args.image;
            input.location = args.lat.zip(args.lon).map(|(lat, lon)| GeoPoint::new(lat, lon));
            match store.add(input) {
                Ok(note) => {
                    println!("{}", note.id);
                    ExitCode::SUCCESS
                }
                Err(err) => fail(&err),
            }
        }
        Command::Show { id } => match store.get(&id) {
            Some(note) => {
                print_details(&note);
                ExitCode::SUCCESS
            }
            None => not_found(&id),
        },
        Command::Edit(args) => {
            let Some(mut note) = store.get(&args.id) else {
                return not_found(&args.id);
            };
            if let Some(title) = args.title {
                note.title = title;
            }
            if let Some(content) = args.content {
                note.content = content;
            }
            match store.update(note) {
                Ok(note) => {
                    print_summary(&note);
                    ExitCode::SUCCESS
                }
                Err(err) => fail(&err),
            }
        }
        Command::Remove { id } => {
            store.remove(&id);
            ExitCode::SUCCESS
        }
        Command::Search { term } => {
            store.search(&term).iter().for_each(print_summary);
            ExitCode::SUCCESS
        }
        Command::Share { id } => match store.get(&id) {
            Some(note) => {
                println!("{}", note.share_text());
                ExitCode::SUCCESS
            }
            None => not_found(&id),
        },
    }
}

fn print_summary(note: &Note) {
    println!(
        "{}\t{}\tcreated={}\tupdated={}",
        note.id, note.title, note.created_at, note.updated_at
    );
}

fn print_details(note: &Note) {
    println!("id: {}", note.id);
    println!("title: {}", note.title);
    println!("created: {}", note.created_at);
    println!("updated: {}", note.updated_at);
    if let Some(uri) = note.audio_uri.as_deref() {
        println!("audio: {uri}");
    }
    if let Some(uri) = note.image_uri.as_deref() {
        println!("image: {uri}");
    }
    if let Some(point) = note.location {
        println!("map: {}", point.map_url());
    }
    println!();
    println!("{}", note.content);
}

fn not_found(id: &str) -> ExitCode {
    eprintln!("error: note not found: {id}");
    ExitCode::FAILURE
}

fn fail(err: &dyn std::error::Error) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::FAILURE
}
