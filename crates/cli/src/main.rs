//! Command-line educational assistant.
//!
//! Chat with a local model, transform answers with one-click actions, and
//! export them as Word documents or PowerPoint decks.

mod actions;
mod repl;
mod session;

use actions::{Action, ActionOutcome};
use aied_core::{ChatMessage, ExportFormat, Role};
use aied_docx::{DocxReader, ParagraphStyle};
use aied_llm::{ChatBackend, LlmConfig, OllamaClient};
use aied_pptx::PptxReader;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use repl::Command;
use session::{ExportedFile, Session};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Educational assistant backed by a local language model.
#[derive(Parser, Debug)]
#[command(name = "aied")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Model service address
    #[arg(long, global = true, default_value = aied_llm::config::DEFAULT_HOST)]
    host: String,

    /// Chat model name
    #[arg(long, global = true, default_value = aied_llm::config::DEFAULT_MODEL)]
    model: String,

    /// Seconds to wait for a model reply
    #[arg(long, global = true, default_value_t = aied_llm::config::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Output directory for exported files (default: current directory)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive chat session
    Chat {
        /// Text file to use as context from the start
        #[arg(long)]
        context: Option<PathBuf>,
    },
    /// Export a markdown/text file as a document
    Export {
        #[arg(value_enum)]
        format: FormatArg,
        input: PathBuf,
    },
    /// Run an action on the contents of a file
    Action {
        #[arg(value_enum)]
        action: Action,
        input: PathBuf,
    },
    /// Print the text of a .docx or .pptx file
    Inspect {
        file: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Word,
    Pptx,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Word => ExportFormat::Word,
            FormatArg::Pptx => ExportFormat::PowerPoint,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let config = LlmConfig::new()
        .with_host(args.host.clone())
        .with_model(args.model.clone())
        .with_timeout(Duration::from_secs(args.timeout_secs));
    let backend = OllamaClient::new(config).context("Failed to set up model client")?;
    log::debug!(
        "Using model {} at {} (timeout {:?})",
        backend.config().model,
        backend.config().host,
        backend.config().timeout
    );

    match &args.command {
        Commands::Chat { context } => run_chat(&args, &backend, context.as_deref()),
        Commands::Export { format, input } => {
            let text = read_text(input)?;
            let file = session::export_text(&text, (*format).into(), &backend)
                .with_context(|| format!("Failed to export {}", input.display()))?;
            save(&args, &file)
        }
        Commands::Action { action, input } => {
            let mut session = Session::new();
            session.push(ChatMessage::user(read_text(input)?));
            match action.perform(&mut session, &backend)? {
                ActionOutcome::Reply(reply) => {
                    println!("{}", reply);
                    Ok(())
                }
                ActionOutcome::File(file) => save(&args, &file),
            }
        }
        Commands::Inspect { file, json } => inspect(file, *json),
    }
}

/// Interactive loop over stdin.
fn run_chat(args: &Args, backend: &dyn ChatBackend, context: Option<&Path>) -> Result<()> {
    let mut session = Session::new();
    if let Some(path) = context {
        session
            .attach_context(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
    }

    println!("What would you like to do today? (/help for commands)");
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match repl::parse_line(&line) {
            Command::Nothing => {}
            Command::Quit => break,
            Command::Help => println!("{}", repl::HELP),
            Command::Invalid(hint) => eprintln!("{}", hint),
            Command::History => print_history(&session),
            Command::Upload(path) => match session.attach_context(&path) {
                Ok(()) => println!("File uploaded successfully."),
                Err(e) => eprintln!("Error: {}", e),
            },
            Command::Prompt(prompt) => match session.ask(backend, &prompt) {
                Ok(reply) => println!("{}", reply),
                Err(e) => eprintln!("Error: {}", e),
            },
            Command::Action(action) => match action.perform(&mut session, backend) {
                Ok(ActionOutcome::Reply(reply)) => println!("{}", reply),
                Ok(ActionOutcome::File(file)) => report(save(args, &file)),
                Err(e) => eprintln!("Error: {}", e),
            },
            Command::Export(format) => match session::export(&session, format, backend) {
                Ok(file) => report(save(args, &file)),
                Err(e) => eprintln!("Error: {}", e),
            },
        }
    }

    Ok(())
}

fn report(result: Result<()>) {
    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
    }
}

fn print_history(session: &Session) {
    if let Some(context) = session.context() {
        println!("(context document: {} chars)", context.chars().count());
    }
    if session.messages().is_empty() {
        println!("(no messages yet)");
    }
    for message in session.messages() {
        let who = match message.role {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        println!("[{}] {}", who, message.content);
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write an exported file into the output directory.
fn save(args: &Args, file: &ExportedFile) -> Result<()> {
    let path = get_output_path(file.file_name, args.output.as_ref())?;
    std::fs::write(&path, &file.bytes)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    println!("Saved {} ({})", path.display(), file.mime_type);
    Ok(())
}

/// Determine where an exported file goes.
fn get_output_path(file_name: &str, output_dir: Option<&PathBuf>) -> Result<PathBuf> {
    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(file_name)
        }
        None => PathBuf::from(file_name),
    };

    Ok(output_path)
}

/// Print the text held in a generated (or any) .docx / .pptx file.
fn inspect(path: &Path, json: bool) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let format = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ExportFormat::from_extension)
        .ok_or_else(|| anyhow::anyhow!("Could not detect file format"))?;

    match format {
        ExportFormat::Word => {
            log::debug!("Reading as DOCX");
            let doc = DocxReader::new().read(&bytes)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
                return Ok(());
            }
            for paragraph in &doc.paragraphs {
                let indent = " ".repeat((paragraph.indent_pt.unwrap_or(0) / 10) as usize);
                match paragraph.style {
                    ParagraphStyle::Heading { level } => {
                        println!("{} {}", "#".repeat(level as usize), paragraph.text())
                    }
                    ParagraphStyle::Normal => println!("{}{}", indent, paragraph.text()),
                }
            }
        }
        ExportFormat::PowerPoint => {
            log::debug!("Reading as PPTX");
            let slides = PptxReader::new().read_bytes(&bytes)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&slides)?);
                return Ok(());
            }
            for slide in &slides {
                println!(
                    "--- Slide {}: {}",
                    slide.number,
                    slide.title.as_deref().unwrap_or("(untitled)")
                );
                for line in &slide.body {
                    println!("  {}", line);
                }
            }
        }
    }

    Ok(())
}
