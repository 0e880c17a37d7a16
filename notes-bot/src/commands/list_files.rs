//! List files command - every note file in the namespace

use super::{CommandContext, Listing, Reply};
use crate::notes::NoteError;

/// Stays under Discord's 4096-character embed description
const DESCRIPTION_BUDGET: usize = 4000;

/// One `- name` line per file until the budget runs out.
/// Returns the lines and how many files they cover.
fn file_lines(files: &[String], budget: usize) -> (String, usize) {
    let mut lines = String::new();
    let mut used = 0;
    let mut shown = 0;
    for file in files {
        let line = format!("- {}", file);
        let needed = line.chars().count() + usize::from(shown > 0);
        if used + needed > budget {
            break;
        }
        if shown > 0 {
            lines.push('\n');
        }
        lines.push_str(&line);
        used += needed;
        shown += 1;
    }
    (lines, shown)
}

/// Execute the list files command
pub async fn execute(ctx: &CommandContext<'_>) -> Result<Reply, NoteError> {
    let files = ctx.store.list_files().await?;

    if files.is_empty() {
        return Ok(Reply::text(format!(
            "There are no note files yet. Create one with `{} regfile <file>`",
            ctx.settings.command_prefix
        )));
    }

    let (description, shown) = file_lines(&files, DESCRIPTION_BUDGET);
    let footer = if shown < files.len() {
        format!("Showing {} of {} files.", shown, files.len())
    } else {
        format!("{} file(s)", files.len())
    };

    Ok(Reply::Listing(Listing {
        title: "Note files".to_string(),
        description: Some(description),
        fields: Vec::new(),
        footer: Some(footer),
    }))
}
