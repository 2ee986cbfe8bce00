//! Line commands understood by the interactive chat.

use crate::actions::Action;
use aied_core::ExportFormat;
use clap::ValueEnum;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text, sent to the model.
    Prompt(String),
    Upload(PathBuf),
    Action(Action),
    Export(ExportFormat),
    History,
    Help,
    Quit,
    /// Blank input.
    Nothing,
    /// A slash command we could not make sense of, with a hint for the user.
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  /upload <file.txt>     use a text file as context for your questions
  /action <name>         translate-french | lesson-plan | vocabulary-list | sparkle | presentation
  /export <word|pptx>    save the latest message as a document
  /history               show the conversation so far
  /help                  show this help
  /quit                  leave";

pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Nothing;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Prompt(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "upload" if arg.is_empty() => Command::Invalid("usage: /upload <file.txt>".to_string()),
        "upload" => Command::Upload(PathBuf::from(arg)),
        "action" => match Action::from_str(arg, true) {
            Ok(action) => Command::Action(action),
            Err(_) => Command::Invalid(format!("unknown action '{}'", arg)),
        },
        "export" => match parse_format(arg) {
            Some(format) => Command::Export(format),
            None => Command::Invalid("usage: /export <word|pptx>".to_string()),
        },
        "history" => Command::History,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Invalid(format!("unknown command '/{}', try /help", name)),
    }
}

pub fn parse_format(s: &str) -> Option<ExportFormat> {
    match s.to_lowercase().as_str() {
        "word" | "docx" => Some(ExportFormat::Word),
        "pptx" | "powerpoint" => Some(ExportFormat::PowerPoint),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_and_blank() {
        assert_eq!(parse_line("   "), Command::Nothing);
        assert_eq!(
            parse_line("  Explain tides "),
            Command::Prompt("Explain tides".to_string())
        );
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(
            parse_line("/upload notes.txt"),
            Command::Upload(PathBuf::from("notes.txt"))
        );
        assert_eq!(
            parse_line("/action lesson-plan"),
            Command::Action(Action::LessonPlan)
        );
        assert_eq!(parse_line("/export PPTX"), Command::Export(ExportFormat::PowerPoint));
        assert_eq!(parse_line("/history"), Command::History);
        assert_eq!(parse_line("/quit"), Command::Quit);
    }

    #[test]
    fn test_invalid_commands() {
        assert!(matches!(parse_line("/upload"), Command::Invalid(_)));
        assert!(matches!(parse_line("/action dance"), Command::Invalid(_)));
        assert!(matches!(parse_line("/export pdf"), Command::Invalid(_)));
        assert!(matches!(parse_line("/nope"), Command::Invalid(_)));
    }
}
