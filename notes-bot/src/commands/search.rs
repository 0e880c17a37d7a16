//! Search command - entries starting with a prefix

use super::{CommandContext, CommandKind, Listing, Reply, load_existing, resolve_file, usage_line};
use crate::config::NotesSettings;
use crate::notes::{NoteError, NoteFile};

pub const MAX_SEARCH_RESULTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchArgs {
    pub file: String,
    pub prefix: String,
}

/// Parse `[file] <prefix>`
pub fn parse(args: &[String], settings: &NotesSettings) -> Result<SearchArgs, NoteError> {
    let Some((file, rest)) = resolve_file(args, 2, settings) else {
        return Err(NoteError::user_input(format!(
            "Not enough arguments for search. Usage: {}",
            usage_line(CommandKind::Search, settings)
        )));
    };

    Ok(SearchArgs {
        file,
        prefix: rest[0].clone(),
    })
}

/// Matching entry names in sorted order, capped at `MAX_SEARCH_RESULTS`,
/// plus the total number of matches
fn matching_entries<'a>(notes: &'a NoteFile, prefix: &str) -> (Vec<&'a str>, usize) {
    let all: Vec<&str> = notes
        .entry_names()
        .filter(|name| name.starts_with(prefix))
        .collect();
    let total = all.len();
    (all.into_iter().take(MAX_SEARCH_RESULTS).collect(), total)
}

/// Execute the search command
pub async fn execute(args: SearchArgs, ctx: &CommandContext<'_>) -> Result<Reply, NoteError> {
    let notes = load_existing(&args.file, ctx).await?;
    let (matches, total) = matching_entries(&notes, &args.prefix);

    if matches.is_empty() {
        return Ok(Reply::text(format!(
            "No entries in {} start with {}",
            args.file, args.prefix
        )));
    }

    let prefix = &ctx.settings.command_prefix;
    let fields = matches
        .iter()
        .map(|entry| {
            (
                entry.to_string(),
                format!("`{} serve {} {}`", prefix, args.file, entry),
            )
        })
        .collect();

    let footer = if total > matches.len() {
        Some(format!(
            "Showing {} of {} matches. Use a longer prefix to narrow it down.",
            matches.len(),
            total
        ))
    } else {
        None
    };

    Ok(Reply::Listing(Listing {
        title: format!("Entries in {} starting with {}", args.file, args.prefix),
        description: None,
        fields,
        footer,
    }))
}
