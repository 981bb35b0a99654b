//! Path parsing
//!
//! Remote paths look like `alias/space[/key]`. Anything else is a local path
//! and passes through unchanged.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// A parsed remote path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePath {
    /// Alias name
    pub alias: String,
    /// Space name
    pub space: String,
    /// Object key or prefix (empty for the space root)
    pub key: String,
}

impl RemotePath {
    pub fn new(alias: impl Into<String>, space: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            space: space.into(),
            key: key.into(),
        }
    }

    /// Whether the path names a directory-like prefix rather than one file
    pub fn is_dir(&self) -> bool {
        self.key.is_empty() || self.key.ends_with('/')
    }

    /// Last component of the key, if any
    pub fn file_name(&self) -> Option<&str> {
        self.key
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
    }

    /// Key of `child` under this path treated as a directory
    pub fn join(&self, child: &str) -> Self {
        let base = self.key.trim_end_matches('/');
        let key = if base.is_empty() {
            child.to_string()
        } else {
            format!("{base}/{child}")
        };
        Self::new(self.alias.clone(), self.space.clone(), key)
    }

    /// The key, or an error if it is empty
    pub fn require_key(&self) -> Result<&str> {
        if self.key.is_empty() {
            Err(Error::InvalidPath(format!("'{self}' does not name a file")))
        } else {
            Ok(&self.key)
        }
    }
}

impl std::fmt::Display for RemotePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}/{}", self.alias, self.space)
        } else {
            write!(f, "{}/{}/{}", self.alias, self.space, self.key)
        }
    }
}

/// A path that is either local or remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedPath {
    Local(PathBuf),
    Remote(RemotePath),
}

impl ParsedPath {
    pub fn is_remote(&self) -> bool {
        matches!(self, ParsedPath::Remote(_))
    }

    pub fn as_remote(&self) -> Option<&RemotePath> {
        match self {
            ParsedPath::Remote(p) => Some(p),
            ParsedPath::Local(_) => None,
        }
    }
}

/// Parse a command-line path
///
/// Absolute paths, `./` and `../` paths, and paths whose first component is
/// not a valid alias name are local.
pub fn parse_path(path: &str) -> Result<ParsedPath> {
    if path.is_empty() {
        return Err(Error::InvalidPath("Path cannot be empty".into()));
    }

    if path.starts_with('/') || path.starts_with("./") || path.starts_with("../") {
        return Ok(ParsedPath::Local(PathBuf::from(path)));
    }

    #[cfg(windows)]
    if path.len() >= 2 && path.chars().nth(1) == Some(':') {
        return Ok(ParsedPath::Local(PathBuf::from(path)));
    }

    let mut parts = path.splitn(3, '/');
    let alias = parts.next().unwrap_or_default();
    let space = parts.next();
    let key = parts.next().unwrap_or_default();

    let Some(space) = space else {
        if alias.contains('.') || alias.contains('\\') {
            return Ok(ParsedPath::Local(PathBuf::from(path)));
        }
        return Err(Error::InvalidPath(format!(
            "Path '{path}' is incomplete. Use format: alias/space[/key]"
        )));
    };

    if !is_valid_alias_name(alias) {
        return Ok(ParsedPath::Local(PathBuf::from(path)));
    }

    if space.is_empty() {
        return Err(Error::InvalidPath("Space name cannot be empty".into()));
    }

    Ok(ParsedPath::Remote(RemotePath::new(alias, space, key)))
}

/// Parse a path that must be remote
pub fn parse_remote(path: &str) -> Result<RemotePath> {
    match parse_path(path)? {
        ParsedPath::Remote(remote) => Ok(remote),
        ParsedPath::Local(_) => Err(Error::InvalidPath(format!(
            "'{path}' is not a remote path. Use format: alias/space[/key]"
        ))),
    }
}

/// Check if a string is a valid alias name
pub fn is_valid_alias_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
