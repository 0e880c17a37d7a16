//! Serve command - replies with the link saved for an entry

use super::{CommandContext, CommandKind, Reply, load_existing, resolve_file, usage_line};
use crate::config::NotesSettings;
use crate::notes::NoteError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeArgs {
    pub file: String,
    pub entry: String,
}

/// Parse `[file] <entry>`. Anything after the entry is ignored.
pub fn parse(args: &[String], settings: &NotesSettings) -> Result<ServeArgs, NoteError> {
    if args.is_empty() {
        return Err(NoteError::user_input(
            "Could not interpret serve command: no entry was given.",
        ));
    }

    let Some((file, rest)) = resolve_file(args, 2, settings) else {
        return Err(NoteError::user_input(format!(
            "Not enough arguments for serve. Usage: {}",
            usage_line(CommandKind::Serve, settings)
        )));
    };

    Ok(ServeArgs {
        file,
        entry: rest[0].clone(),
    })
}

/// Execute the serve command
pub async fn execute(args: ServeArgs, ctx: &CommandContext<'_>) -> Result<Reply, NoteError> {
    let notes = load_existing(&args.file, ctx).await?;

    match notes.get(&args.entry) {
        Some(link) => Ok(Reply::text(link)),
        None => Ok(Reply::text(format!("No link exists for {}", args.entry))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse() {
        let parsed = parse(&args(&["notes.json", "jan-m"]), &NotesSettings::default()).unwrap();
        assert_eq!(parsed.file, "notes.json");
        assert_eq!(parsed.entry, "jan-m");
    }

    #[test]
    fn test_parse_ignores_extra_args() {
        let parsed = parse(&args(&["notes.json", "jan-m", "please"]), &NotesSettings::default()).unwrap();
        assert_eq!(parsed.entry, "jan-m");
    }

    #[test]
    fn test_parse_missing_entry() {
        let settings = NotesSettings::default();
        assert!(matches!(parse(&[], &settings), Err(NoteError::UserInput(_))));
        assert!(matches!(
            parse(&args(&["jan-m"]), &settings),
            Err(NoteError::UserInput(_))
        ));
    }

    #[test]
    fn test_parse_default_file() {
        let settings = NotesSettings {
            default_file: Some("meeting-note-links.json".to_string()),
            ..NotesSettings::default()
        };
        let parsed = parse(&args(&["jan-m"]), &settings).unwrap();
        assert_eq!(parsed.file, "meeting-note-links.json");
        assert_eq!(parsed.entry, "jan-m");
    }
}
