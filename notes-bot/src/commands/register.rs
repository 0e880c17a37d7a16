//! Register command - saves a link under an entry name in a note file

use super::{CommandContext, CommandKind, Reply, load_existing, resolve_file, usage_line};
use crate::config::NotesSettings;
use crate::notes::{NoteError, validate};

const UPDATE_FLAG: &str = "--update";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterArgs {
    pub file: String,
    pub entry: String,
    pub link: String,
    pub update: bool,
}

/// Parse `[file] <entry> <link> [--update]`
pub fn parse(args: &[String], settings: &NotesSettings) -> Result<RegisterArgs, NoteError> {
    if args.is_empty() {
        return Err(NoteError::user_input(
            "Could not interpret register command: no arguments were given.",
        ));
    }

    // The flag only counts directly after the link. Anything past the
    // third positional is ignored.
    let (positional, update) = match args {
        [_, _, _, flag, ..] if flag == UPDATE_FLAG => (&args[..3], true),
        [_, _, flag] if flag == UPDATE_FLAG => (&args[..2], true),
        _ => (&args[..args.len().min(3)], false),
    };

    let Some((file, rest)) = resolve_file(positional, 3, settings) else {
        return Err(NoteError::user_input(format!(
            "Not enough arguments for register. Usage: {}",
            usage_line(CommandKind::Register, settings)
        )));
    };

    Ok(RegisterArgs {
        file,
        entry: rest[0].clone(),
        link: rest[1].clone(),
        update,
    })
}

/// Execute the register command
pub async fn execute(args: RegisterArgs, ctx: &CommandContext<'_>) -> Result<Reply, NoteError> {
    let mut notes = load_existing(&args.file, ctx).await?;

    if !validate::is_valid_url(&args.link) {
        return Err(NoteError::validation(format!("Invalid URL: {}", args.link)));
    }

    if ctx.settings.enforce_entry_grammar && !validate::is_valid_entry_name(&args.entry) {
        return Err(NoteError::validation(format!(
            "Invalid entry name `{}`. Entry names look like `<month>-<week>`, \
            e.g. `jan-w1`, `feb-w4`, `mar-m` or `dec-other`.",
            args.entry
        )));
    }

    if ctx.settings.is_reserved(&args.entry) {
        return Err(NoteError::validation(format!(
            "`{}` is a reserved word and can't be used as an entry name.",
            args.entry
        )));
    }

    let exists = notes.contains(&args.entry);
    if exists && !args.update {
        return Err(NoteError::conflict(format!(
            "A link already exists for {}, and you did not specify to update using {}.",
            args.entry, UPDATE_FLAG
        )));
    }

    notes.set(&args.entry, &args.link);
    ctx.store.save(&args.file, &notes).await?;

    log::info!(
        "Notes: {} {} in {}",
        if exists { "Updated" } else { "Registered" },
        args.entry,
        args.file
    );

    if exists {
        Ok(Reply::text(format!(
            "A link already exists for {}: Updating link...\nSaved link for {}",
            args.entry, args.entry
        )))
    } else {
        Ok(Reply::text(format!("Saved link for {}", args.entry)))
    }
}
