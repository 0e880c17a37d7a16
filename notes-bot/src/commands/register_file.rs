//! Register file command - creates an empty note file

use super::{CommandContext, CommandKind, Reply, usage_line};
use crate::config::NotesSettings;
use crate::notes::{NoteError, NoteFile, validate};
use chrono::Utc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFileArgs {
    pub file: String,
}

/// Parse `<file>`
pub fn parse(args: &[String], settings: &NotesSettings) -> Result<RegisterFileArgs, NoteError> {
    match args.first() {
        Some(file) => Ok(RegisterFileArgs { file: file.clone() }),
        None => Err(NoteError::user_input(format!(
            "Not enough arguments for regfile. Usage: {}",
            usage_line(CommandKind::RegisterFile, settings)
        ))),
    }
}

/// Execute the register file command
pub async fn execute(args: RegisterFileArgs, ctx: &CommandContext<'_>) -> Result<Reply, NoteError> {
    validate::check_file_name(&args.file).map_err(NoteError::validation)?;

    if ctx.settings.is_reserved(&args.file) {
        return Err(NoteError::validation(format!(
            "`{}` is a reserved word and can't be used as a file name.",
            args.file
        )));
    }

    if ctx.store.exists(&args.file).await? {
        return Err(NoteError::conflict(format!(
            "A note file named {} already exists.",
            args.file
        )));
    }

    let notes = NoteFile::seeded(Utc::now());
    ctx.store.save(&args.file, &notes).await?;
    log::info!(
        "Notes: Created note file {} in {} at {}",
        args.file,
        ctx.store.describe(),
        notes.created_at().unwrap_or("unknown time")
    );

    Ok(Reply::text(format!(
        "Created note file {}. Add links with `{} reg {} <entry> <link>`",
        args.file, ctx.settings.command_prefix, args.file
    )))
}
