//! Text command handling: `!notes <command> [args...]`

mod help;
mod list_files;
mod register;
mod register_file;
mod search;
mod serve;


use crate::config::NotesSettings;
use crate::notes::{NoteError, NoteFile, NoteStore, validate};
use strum::{AsRefStr, EnumIter};

pub use register::RegisterArgs;
pub use register_file::RegisterFileArgs;
pub use search::SearchArgs;
pub use serve::ServeArgs;

/// Everything a command needs besides its own arguments
pub struct CommandContext<'a> {
    pub store: &'a NoteStore,
    pub settings: &'a NotesSettings,
}

/// Known command keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum CommandKind {
    Register,
    Serve,
    Search,
    RegisterFile,
    ListFiles,
    Help,
}

impl CommandKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_lowercase().as_str() {
            "reg" | "register" => Some(CommandKind::Register),
            "serve" => Some(CommandKind::Serve),
            "search" => Some(CommandKind::Search),
            "regfile" | "registerfile" => Some(CommandKind::RegisterFile),
            "listfiles" | "listallfiles" => Some(CommandKind::ListFiles),
            "help" | "?" => Some(CommandKind::Help),
            _ => None,
        }
    }

    /// Keyword shown in help and in suggested commands
    pub fn keyword(&self) -> &'static str {
        match self {
            CommandKind::Register => "reg",
            CommandKind::Serve => "serve",
            CommandKind::Search => "search",
            CommandKind::RegisterFile => "regfile",
            CommandKind::ListFiles => "listfiles",
            CommandKind::Help => "help",
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            CommandKind::Register => "[file] <entry> <link> [--update]",
            CommandKind::Serve => "[file] <entry>",
            CommandKind::Search => "[file] <prefix>",
            CommandKind::RegisterFile => "<file>",
            CommandKind::ListFiles => "",
            CommandKind::Help => "",
        }
    }
}

/// A command with its arguments checked against the command's arity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register(RegisterArgs),
    Serve(ServeArgs),
    Search(SearchArgs),
    RegisterFile(RegisterFileArgs),
    ListFiles,
    Help,
}

impl Command {
    pub fn parse(kind: CommandKind, args: &[String], settings: &NotesSettings) -> Result<Self, NoteError> {
        match kind {
            CommandKind::Register => register::parse(args, settings).map(Command::Register),
            CommandKind::Serve => serve::parse(args, settings).map(Command::Serve),
            CommandKind::Search => search::parse(args, settings).map(Command::Search),
            CommandKind::RegisterFile => register_file::parse(args, settings).map(Command::RegisterFile),
            CommandKind::ListFiles => Ok(Command::ListFiles),
            CommandKind::Help => Ok(Command::Help),
        }
    }
}

/// A message addressed to the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Just the prefix
    NoCommand,
    /// A keyword that isn't a known command
    Unknown(String),
    Known { kind: CommandKind, args: Vec<String> },
}

/// Split a message into command keyword and arguments.
/// Returns `None` when the message isn't addressed to the bot.
pub fn parse(text: &str, prefix: &str) -> Option<Invocation> {
    let mut parts = text.split_whitespace();
    if parts.next()? != prefix {
        return None;
    }

    let Some(keyword) = parts.next() else {
        return Some(Invocation::NoCommand);
    };
    let args: Vec<String> = parts.map(str::to_string).collect();

    log::debug!(
        "Notes commands: Parsing '{}' -> keyword '{}', {} args",
        text,
        keyword,
        args.len()
    );

    match CommandKind::from_keyword(keyword) {
        Some(kind) => Some(Invocation::Known { kind, args }),
        None => Some(Invocation::Unknown(keyword.to_string())),
    }
}

/// A two-column listing, rendered as an embed by the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<(String, String)>,
    pub footer: Option<String>,
}

/// What the bot sends back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// An optional error line followed by the command help
    Help { message: Option<String>, help: Listing },
    Listing(Listing),
}

impl Reply {
    pub fn text(message: impl Into<String>) -> Self {
        Reply::Text(message.into())
    }

    /// Flatten to plain text, for logs and tests
    pub fn to_plain_text(&self) -> String {
        fn listing_text(listing: &Listing) -> String {
            let mut out = format!("**{}**", listing.title);
            if let Some(description) = &listing.description {
                out.push('\n');
                out.push_str(description);
            }
            for (name, value) in &listing.fields {
                out.push_str(&format!("\n{}: {}", name, value));
            }
            if let Some(footer) = &listing.footer {
                out.push('\n');
                out.push_str(footer);
            }
            out
        }

        match self {
            Reply::Text(text) => text.clone(),
            Reply::Help { message, help } => match message {
                Some(m) => format!("{}\n\n{}", m, listing_text(help)),
                None => listing_text(help),
            },
            Reply::Listing(listing) => listing_text(listing),
        }
    }
}

const STORAGE_FAILURE_MESSAGE: &str =
    "Something went wrong while accessing the note files. Please try again later.";

/// Turn a failed command into the reply the user sees
pub fn reply_for_error(error: NoteError, settings: &NotesSettings) -> Reply {
    match error {
        NoteError::UserInput(message) | NoteError::Conflict(message) => Reply::Help {
            message: Some(message),
            help: help::listing(settings),
        },
        NoteError::Validation(message) | NoteError::NotFound(message) => Reply::Text(message),
        NoteError::Storage(e) => {
            log::error!("Notes: Storage failure: {}", e);
            Reply::text(STORAGE_FAILURE_MESSAGE)
        }
    }
}

/// Execute a parsed command
pub async fn execute(cmd: Command, ctx: &CommandContext<'_>) -> Result<Reply, NoteError> {
    match cmd {
        Command::Register(args) => register::execute(args, ctx).await,
        Command::Serve(args) => serve::execute(args, ctx).await,
        Command::Search(args) => search::execute(args, ctx).await,
        Command::RegisterFile(args) => register_file::execute(args, ctx).await,
        Command::ListFiles => list_files::execute(ctx).await,
        Command::Help => Ok(Reply::Help {
            message: None,
            help: help::listing(ctx.settings),
        }),
    }
}

/// Handle one inbound message end to end.
/// Returns `None` when the message isn't a bot command.
pub async fn handle(text: &str, ctx: &CommandContext<'_>) -> Option<Reply> {
    let settings = ctx.settings;
    let invocation = parse(text, &settings.command_prefix)?;

    let reply = match invocation {
        Invocation::NoCommand => Reply::Help {
            message: Some("You didn't seem to put a command in!".to_string()),
            help: help::listing(settings),
        },
        Invocation::Unknown(keyword) => {
            log::debug!("Notes commands: Unknown command '{}'", keyword);
            Reply::Help {
                message: Some(format!("Could not interpret command {}", keyword)),
                help: help::listing(settings),
            }
        }
        Invocation::Known { kind, args } => {
            let result = match Command::parse(kind, &args, settings) {
                Ok(cmd) => execute(cmd, ctx).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(reply) => reply,
                Err(e) => {
                    log::info!("Notes commands: {} rejected ({}): {}", kind.as_ref(), e.kind(), e);
                    reply_for_error(e, settings)
                }
            }
        }
    };

    Some(reply)
}

/// Pick the target file: explicit when `args` has `explicit_arity` items,
/// otherwise the configured default file when `args` is one shorter.
/// Returns the file and the remaining arguments.
fn resolve_file<'a>(
    args: &'a [String],
    explicit_arity: usize,
    settings: &NotesSettings,
) -> Option<(String, &'a [String])> {
    if args.len() >= explicit_arity {
        return Some((args[0].clone(), &args[1..]));
    }
    match settings.default_file.as_deref() {
        Some(default) if args.len() + 1 == explicit_arity => Some((default.to_string(), args)),
        _ => None,
    }
}

fn usage_line(kind: CommandKind, settings: &NotesSettings) -> String {
    let usage = kind.usage();
    if usage.is_empty() {
        format!("`{} {}`", settings.command_prefix, kind.keyword())
    } else {
        format!("`{} {} {}`", settings.command_prefix, kind.keyword(), usage)
    }
}

/// Load a note-file that must already exist
async fn load_existing(file: &str, ctx: &CommandContext<'_>) -> Result<NoteFile, NoteError> {
    validate::check_file_name(file).map_err(NoteError::validation)?;
    ctx.store.load(file).await?.ok_or_else(|| {
        NoteError::not_found(format!(
            "The note file `{}` does not exist. Create it with `{} regfile {}`",
            file, ctx.settings.command_prefix, file
        ))
    })
}
