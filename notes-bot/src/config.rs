use std::env;
use std::path::PathBuf;

/// Where note-files are persisted
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageConfig {
    /// A directory on the local filesystem
    Local { dir: PathBuf },
    /// An S3-compatible bucket, one object per note-file under `prefix/`
    S3(S3Config),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub endpoint: String,
    pub prefix: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Behaviour of the command layer
#[derive(Clone, Debug)]
pub struct NotesSettings {
    /// First token every bot command starts with, e.g. `!notes`
    pub command_prefix: String,
    /// File used when a command omits its `[file]` argument
    pub default_file: Option<String>,
    /// Require entry names of the form `<month>-<w1..w4|m|other>`
    pub enforce_entry_grammar: bool,
    /// Names that may not be used for entries or files
    pub reserved_words: Vec<String>,
}

/// Words every deployment reserves. `_created` is the sentinel written by `regfile`.
pub const BUILTIN_RESERVED_WORDS: &[&str] = &["_created", "--update", "help"];

impl Default for NotesSettings {
    fn default() -> Self {
        Self {
            command_prefix: "!notes".to_string(),
            default_file: None,
            enforce_entry_grammar: true,
            reserved_words: BUILTIN_RESERVED_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl NotesSettings {
    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved_words.iter().any(|w| w == word)
    }
}

#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    pub notes: NotesSettings,
    pub storage: StorageConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok()).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bot_token = var("BOT_TOKEN").ok_or("BOT_TOKEN must be set")?;

        let mut reserved_words: Vec<String> =
            BUILTIN_RESERVED_WORDS.iter().map(|w| w.to_string()).collect();
        if let Some(extra) = var("NOTES_RESERVED_WORDS") {
            for word in extra.split(',').map(str::trim).filter(|w| !w.is_empty()) {
                if !reserved_words.iter().any(|w| w == word) {
                    reserved_words.push(word.to_string());
                }
            }
        }

        let enforce_entry_grammar = match var("NOTES_ENFORCE_ENTRY_GRAMMAR") {
            Some(v) => parse_bool(&v)
                .ok_or_else(|| format!("NOTES_ENFORCE_ENTRY_GRAMMAR must be true or false, got '{}'", v))?,
            None => true,
        };

        let notes = NotesSettings {
            command_prefix: var("NOTES_COMMAND_PREFIX").unwrap_or_else(|| "!notes".to_string()),
            default_file: var("NOTES_DEFAULT_FILE"),
            enforce_entry_grammar,
            reserved_words,
        };

        let backend = var("NOTES_BACKEND").unwrap_or_else(|| "local".to_string());
        let storage = match backend.to_lowercase().as_str() {
            "local" => StorageConfig::Local {
                dir: PathBuf::from(var("NOTES_DIR").unwrap_or_else(|| "./notes".to_string())),
            },
            "s3" => {
                let region = var("NOTES_S3_REGION").unwrap_or_else(|| "us-east-1".to_string());
                let endpoint = var("NOTES_S3_ENDPOINT")
                    .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", region));
                StorageConfig::S3(S3Config {
                    bucket: var("NOTES_S3_BUCKET").ok_or("NOTES_S3_BUCKET must be set for the s3 backend")?,
                    endpoint: endpoint.trim_end_matches('/').to_string(),
                    region,
                    prefix: var("NOTES_S3_PREFIX")
                        .map(|p| p.trim_matches('/').to_string())
                        .unwrap_or_else(|| "notes".to_string()),
                    access_key_id: var("AWS_ACCESS_KEY_ID")
                        .ok_or("AWS_ACCESS_KEY_ID must be set for the s3 backend")?,
                    secret_access_key: var("AWS_SECRET_ACCESS_KEY")
                        .ok_or("AWS_SECRET_ACCESS_KEY must be set for the s3 backend")?,
                })
            }
            other => return Err(format!("NOTES_BACKEND must be 'local' or 's3', got '{}'", other)),
        };

        Ok(Self {
            bot_token,
            notes,
            storage,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
