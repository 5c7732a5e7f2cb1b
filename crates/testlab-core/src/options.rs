//! User option parsing.
//!
//! The options string is split with POSIX shell word rules (see
//! [`shell_words::split`]): whitespace separates tokens, single quotes keep
//! everything literally, and inside double quotes `\` only escapes `$`,
//! `` ` ``, `"`, `\` and newline. A `#` starting a word comments out the rest
//! of the line. A trailing unescaped `\` is rejected.
//!
//! Flags found in the tokens become an [`OverrideSet`], which decides which
//! computed flags are left out of the final command.

use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Tokenizer failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("missing closing quote")]
    UnterminatedQuote,

    #[error("unterminated backslash-escape")]
    UnterminatedEscape,
}

impl From<shell_words::ParseError> for QuoteError {
    fn from(_: shell_words::ParseError) -> Self {
        QuoteError::UnterminatedQuote
    }
}

/// Split a shell-quoted string into tokens.
pub fn tokenize(raw: &str) -> Result<Vec<String>, QuoteError> {
    let tokens = shell_words::split(raw)?;

    // shell_words keeps a dangling `\` as a literal; an odd run at the very
    // end can only be an escape with nothing left to escape.
    let trailing = raw.chars().rev().take_while(|&c| c == '\\').count();
    if trailing % 2 == 1 {
        return Err(QuoteError::UnterminatedEscape);
    }

    Ok(tokens)
}

/// Render arguments as a single shell-quoted line for logs.
pub fn printable_command<S: AsRef<str>>(args: &[S]) -> String {
    shell_words::join(args)
}

/// Key of a command-line flag.
///
/// `--test path` and `--test=path` are different keys: the first is
/// [`FlagKey::Separate`], the second [`FlagKey::Joined`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlagKey {
    /// Flag whose value is the next token, e.g. `--app app.apk`.
    Separate(String),
    /// Flag carrying its value after `=`, e.g. `--results-dir=out`.
    Joined(String),
}

impl FlagKey {
    pub fn separate(name: impl Into<String>) -> Self {
        FlagKey::Separate(name.into())
    }

    pub fn joined(name: impl Into<String>) -> Self {
        FlagKey::Joined(name.into())
    }

    /// Classify a user token.
    ///
    /// Returns `None` for positional values such as the `custom.apk` in
    /// `--app custom.apk`.
    pub fn from_token(token: &str) -> Option<Self> {
        if let Some((name, _)) = token.split_once('=') {
            return Some(FlagKey::Joined(name.to_string()));
        }
        if token.starts_with('-') {
            return Some(FlagKey::Separate(token.to_string()));
        }
        None
    }

    /// Flag name without any `=`.
    pub fn name(&self) -> &str {
        match self {
            FlagKey::Separate(name) | FlagKey::Joined(name) => name,
        }
    }

    /// Tokens for this flag set to `value`.
    pub fn with_value(&self, value: &str) -> Vec<String> {
        match self {
            FlagKey::Separate(name) => vec![name.clone(), value.to_string()],
            FlagKey::Joined(name) => vec![format!("{}={}", name, value)],
        }
    }
}

impl fmt::Display for FlagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagKey::Separate(name) => write!(f, "{}", name),
            FlagKey::Joined(name) => write!(f, "{}=", name),
        }
    }
}

/// Flags the user set explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSet {
    keys: HashSet<FlagKey>,
}

impl OverrideSet {
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let keys = tokens
            .iter()
            .filter_map(|t| FlagKey::from_token(t.as_ref()))
            .collect();
        Self { keys }
    }

    pub fn contains(&self, key: &FlagKey) -> bool {
        self.keys.contains(key)
    }

    /// Keys in their textual form (`--test`, `--results-dir=`), sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.keys.iter().map(|k| k.to_string()).collect();
        keys.sort();
        keys
    }
}
