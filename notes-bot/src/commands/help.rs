//! Help command - usage summary for every command

use super::{CommandKind, Listing, usage_line};
use crate::config::NotesSettings;
use strum::IntoEnumIterator;

fn describe(kind: CommandKind) -> (&'static str, &'static str) {
    match kind {
        CommandKind::Register => (
            "Register a link",
            "Saves a link under an entry name like `jan-w1` or `mar-m`. \
            Add `--update` to replace an existing link. Alias: `register`",
        ),
        CommandKind::Serve => ("Serve a link", "Replies with the link saved for an entry."),
        CommandKind::Search => (
            "Search entries",
            "Lists up to 10 entries starting with the prefix.",
        ),
        CommandKind::RegisterFile => (
            "Create a note file",
            "Creates an empty note file. Alias: `registerfile`",
        ),
        CommandKind::ListFiles => ("List note files", "Alias: `listallfiles`"),
        CommandKind::Help => ("Help", "Shows this message."),
    }
}

/// The help listing shown for `help` and after corrective errors
pub fn listing(settings: &NotesSettings) -> Listing {
    let mut description =
        "How to use me to register and serve up meeting notes!".to_string();
    if let Some(default) = &settings.default_file {
        description.push_str(&format!(
            "\nCommands without a `[file]` use `{}`.",
            default
        ));
    }

    Listing {
        title: "Commands Help".to_string(),
        description: Some(description),
        fields: CommandKind::iter()
            .map(|kind| {
                let (name, details) = describe(kind);
                (
                    name.to_string(),
                    format!("Usage: {}\n{}", usage_line(kind, settings), details),
                )
            })
            .collect(),
        footer: if settings.enforce_entry_grammar {
            Some(
                "Entry names look like <month>-<w1|w2|w3|w4|m|other>, e.g. jan-w1".to_string(),
            )
        } else {
            None
        },
    }
}
