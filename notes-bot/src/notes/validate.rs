//! Link, entry-name and file-name checks

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// `<month>-<week or note kind>`, e.g. `jan-w1`, `mar-m`, `dec-other`
static ENTRY_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)-(w1|w2|w3|w4|m|other)$")
        .expect("valid regex")
});

const MAX_FILE_NAME_LEN: usize = 100;

/// An absolute http(s) URL with a host
pub fn is_valid_url(link: &str) -> bool {
    match Url::parse(link) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

pub fn is_valid_entry_name(entry: &str) -> bool {
    ENTRY_NAME_PATTERN.is_match(entry)
}

/// Check a note-file name can be used as a single storage key.
/// Returns the reason when it can't.
pub fn check_file_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("File names cannot be empty.".to_string());
    }
    if name.chars().count() > MAX_FILE_NAME_LEN {
        return Err(format!(
            "File names can be at most {} characters long.",
            MAX_FILE_NAME_LEN
        ));
    }
    if name.starts_with('.') {
        return Err(format!("Invalid file name `{}`: cannot start with `.`", name));
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(format!(
            "Invalid file name `{}`: path separators are not allowed.",
            name
        ));
    }
    Ok(())
}
