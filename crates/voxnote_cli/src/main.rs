//! Terminal host for `voxnote_core`.
//!
//! # Responsibility
//! - Wire a SQLite key-value slot, config file and logging into a session.
//! - Expose add/list/delete and a stdin-driven dictation flow.

use chrono::Utc;
use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use voxnote_core::{
    init_logging, AppConfig, DevicePermission, NoticeSeverity, NotesApp, PermissionAnswer,
    PermissionGate, PermissionState, RecognitionConfig, RecognitionEngine, RecognitionError,
    RecognitionResult, SpeechCapability, SqliteKeyValueStore, StartOutcome,
};

#[derive(Debug, Parser)]
#[command(name = "voxnote", version, about = "Local notes with voice dictation")]
struct Cli {
    /// SQLite database holding the note snapshot.
    #[arg(long, default_value = "voxnote.db")]
    db: PathBuf,
    /// Optional JSON config file.
    #[arg(long, default_value = "voxnote.json")]
    config: PathBuf,
    /// Directory for rolling log files. Logging is off when unset.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Save a typed note.
    Add {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// List notes, newest first.
    List {
        /// Case-insensitive substring filter.
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Delete one note by id.
    Delete { id: String },
    /// Dictate a note: every stdin line is one recognized segment; an empty
    /// line or EOF stops recording and saves.
    Dictate {
        /// Microphone permission state reported to the recorder
        /// (`granted`, `denied` or `prompt` to ask on the terminal).
        #[arg(long, default_value = "granted", value_parser = PermissionState::parse)]
        permission: PermissionState,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::List { .. } => "list",
            Self::Delete { .. } => "delete",
            Self::Dictate { .. } => "dictate",
        }
    }
}

/// Engine whose results are fed by the command loop.
struct ConsoleEngine;

impl RecognitionEngine for ConsoleEngine {
    fn start(&mut self, config: &RecognitionConfig) -> Result<(), RecognitionError> {
        eprintln!(
            "gravando ({}): digite o que falar, linha vazia para parar",
            config.lang
        );
        Ok(())
    }

    fn stop(&mut self) {
        eprintln!("gravação encerrada");
    }
}

struct ConsoleSpeech;

impl SpeechCapability for ConsoleSpeech {
    type Engine = ConsoleEngine;

    fn is_supported(&self) -> bool {
        true
    }

    fn create_engine(&mut self) -> Result<ConsoleEngine, RecognitionError> {
        Ok(ConsoleEngine)
    }
}

/// Reports a fixed permission state; `prompt` asks on the terminal.
struct ConsolePermission {
    state: PermissionState,
}

impl PermissionGate for ConsolePermission {
    fn query(&mut self, _permission: DevicePermission) -> PermissionAnswer {
        PermissionAnswer::Ready(self.state)
    }

    fn request(&mut self, permission: DevicePermission) -> PermissionAnswer {
        eprint!("permitir acesso ao {}? [s/N] ", permission_label(permission));
        let mut answer = String::new();
        if let Err(err) = io::stdin().lock().read_line(&mut answer) {
            return PermissionAnswer::Failed(err.to_string());
        }
        let granted = matches!(answer.trim().to_lowercase().as_str(), "s" | "sim");
        PermissionAnswer::Ready(if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        })
    }
}

fn permission_label(permission: DevicePermission) -> &'static str {
    match permission {
        DevicePermission::Microphone => "microfone",
    }
}

type CliApp = NotesApp<SqliteKeyValueStore, ConsoleSpeech, ConsolePermission>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("erro: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load_or_default(&cli.config)?;
    if let Some(log_dir) = cli.log_dir.as_ref() {
        let log_dir = if log_dir.is_absolute() {
            log_dir.clone()
        } else {
            std::env::current_dir()?.join(log_dir)
        };
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    let permission = match &cli.command {
        Command::Dictate { permission } => *permission,
        _ => PermissionState::Granted,
    };
    let storage = SqliteKeyValueStore::open(&cli.db)?;
    let mut app: CliApp = NotesApp::bootstrap(
        storage,
        ConsoleSpeech,
        ConsolePermission { state: permission },
        &config,
    )?;

    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );
    let result = match cli.command {
        Command::Add { text } => add(&mut app, text.join(" ")),
        Command::List { search } => {
            list(&mut app, search.unwrap_or_default());
            Ok(())
        }
        Command::Delete { id } => delete(&mut app, &id),
        Command::Dictate { .. } => dictate(&mut app),
    };
    print_notices(&mut app);
    result
}

fn add(app: &mut CliApp, text: String) -> Result<(), Box<dyn Error>> {
    let dialog = app.dialog_mut();
    dialog.open();
    dialog.choose_typing();
    dialog.set_draft(text);
    match app.save_draft()? {
        Some(note) => println!("{}", note.id),
        None => eprintln!("nada para salvar"),
    }
    Ok(())
}

fn list(app: &mut CliApp, query: String) {
    app.set_search_query(query);
    for card in app.cards(Utc::now()) {
        println!("{}  {:<16}  {}", card.id, card.age_label, card.excerpt);
    }
}

fn delete(app: &mut CliApp, id: &str) -> Result<(), Box<dyn Error>> {
    if app.store().get(id).is_none() {
        eprintln!("nenhuma nota com id {id}");
    }
    app.delete_note(id)?;
    Ok(())
}

fn dictate(app: &mut CliApp) -> Result<(), Box<dyn Error>> {
    let dialog = app.dialog_mut();
    dialog.open();
    let session = match dialog.start_recording()? {
        StartOutcome::Listening(session) => session,
        _ => return Ok(()),
    };

    let mut segments: Vec<RecognitionResult> = Vec::new();
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        let separator = if segments.is_empty() { "" } else { " " };
        segments.push(RecognitionResult::single(format!("{separator}{line}"), true));
        dialog.on_recognition_result(session, &segments);
        eprint!("\r{}", dialog.draft());
        io::stderr().flush()?;
    }
    eprintln!();
    dialog.stop_recording();

    match app.save_draft()? {
        Some(note) => println!("{}", note.id),
        None => eprintln!("nada foi ditado"),
    }
    Ok(())
}

fn print_notices(app: &mut CliApp) {
    for notice in app.drain_notices() {
        match notice.severity() {
            NoticeSeverity::Info => eprintln!("{}", notice.message()),
            NoticeSeverity::Error => eprintln!("! {}", notice.message()),
        }
    }
}
