// src/portage/info.rs

//! Parser for shell-style variable dumps
//!
//! `ebuild <file> info` and `portageq envvar -v` print variables as shell
//! assignments. The output is parsed here as data and never evaluated.
//! Supported forms:
//!
//! ```text
//! ARCH='amd64'
//! PORTDIR_OVERLAY="/a /b"
//! CROS_WORKON_PROJECT=("chromiumos/platform2" "aosp/platform/external/foo")
//! declare -a CROS_WORKON_SRCDIR=([0]="/src/platform2" [1]="/src/aosp/foo")
//! CROS_WORKON_LOCALNAME=platform2
//! ```
//!
//! Lines that are not assignments (progress output from the ebuild phase)
//! are skipped.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A parsed variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoValue {
    Scalar(String),
    Array(Vec<String>),
}

/// All variables found in one dump
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoRecord {
    values: BTreeMap<String, InfoValue>,
}

impl InfoRecord {
    /// Parse a dump; later assignments to the same name win
    pub fn parse(text: &str) -> Result<Self> {
        let mut values = BTreeMap::new();
        let mut lines = text.lines();

        while let Some(line) = lines.next() {
            let Some((name, rest)) = split_assignment(line) else {
                continue;
            };

            if let Some(body) = rest.strip_prefix('(') {
                // Arrays may continue over several lines until the closing paren
                let mut body = body.to_string();
                while !array_closed(&body) {
                    let next = lines.next().ok_or_else(|| {
                        Error::Parse(format!("Unterminated array for {}", name))
                    })?;
                    body.push('\n');
                    body.push_str(next);
                }
                let inner = body.trim_end();
                let inner = inner.strip_suffix(')').unwrap_or(inner);

                let items = split_words(inner)?
                    .into_iter()
                    .map(|word| unquote(strip_index(&word)))
                    .collect::<Result<Vec<_>>>()?;
                values.insert(name.to_string(), InfoValue::Array(items));
            } else {
                values.insert(name.to_string(), InfoValue::Scalar(unquote(rest.trim())?));
            }
        }

        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&InfoValue> {
        self.values.get(name)
    }

    /// Scalar value, or the first element of an array
    pub fn scalar(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            InfoValue::Scalar(s) => Some(s),
            InfoValue::Array(items) => items.first().map(String::as_str),
        }
    }

    /// Array elements; a scalar is a one-element list, an empty scalar an empty one
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.values.get(name) {
            Some(InfoValue::Array(items)) => items.clone(),
            Some(InfoValue::Scalar(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Whitespace-separated words of a scalar (or the elements of an array)
    pub fn words(&self, name: &str) -> Vec<String> {
        match self.values.get(name) {
            Some(InfoValue::Array(items)) => items.clone(),
            Some(InfoValue::Scalar(s)) => s.split_whitespace().map(str::to_string).collect(),
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Checkout layout declared by a cros-workon ebuild
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EbuildInfo {
    /// Absolute source directories (`CROS_WORKON_SRCDIR`)
    pub srcdirs: Vec<PathBuf>,
    /// Manifest project names (`CROS_WORKON_PROJECT`), parallel to `srcdirs`
    pub projects: Vec<String>,
}

impl EbuildInfo {
    pub fn from_record(record: &InfoRecord) -> Self {
        Self {
            srcdirs: record
                .list("CROS_WORKON_SRCDIR")
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            projects: record.list("CROS_WORKON_PROJECT"),
        }
    }

    /// `(project, srcdir)` pairs
    pub fn sources(&self) -> Result<Vec<(String, PathBuf)>> {
        if self.srcdirs.len() != self.projects.len() {
            return Err(Error::Parse(format!(
                "CROS_WORKON_SRCDIR has {} entries but CROS_WORKON_PROJECT has {}",
                self.srcdirs.len(),
                self.projects.len()
            )));
        }
        Ok(self
            .projects
            .iter()
            .cloned()
            .zip(self.srcdirs.iter().cloned())
            .collect())
    }
}

/// Split `[declare -a ]NAME=rest`
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let mut line = line.trim();
    if let Some(rest) = line.strip_prefix("declare ") {
        line = rest.trim_start();
        while line.starts_with('-') {
            let end = line.find(char::is_whitespace)?;
            line = line[end..].trim_start();
        }
    }

    let (name, rest) = line.split_once('=')?;
    let mut chars = name.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_')
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return None;
    }
    Some((name, rest))
}

/// Whether an array body has reached its unquoted closing paren
fn array_closed(body: &str) -> bool {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in body.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some('\''), '\'') => quote = None,
            (Some('\''), _) => {}
            (_, '\\') => escaped = true,
            (Some('"'), '"') => quote = None,
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, ')') => return true,
            _ => {}
        }
    }
    false
}

/// Split on unquoted whitespace, keeping each word's quoting intact
fn split_words(s: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in s.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some('\''), '\'') => {
                quote = None;
                current.push(c);
            }
            (Some('\''), _) => current.push(c),
            (_, '\\') => {
                escaped = true;
                current.push(c);
            }
            (Some('"'), '"') => {
                quote = None;
                current.push(c);
            }
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                current.push(c);
            }
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if quote.is_some() {
        return Err(Error::Parse(format!("Unterminated quote in '{}'", s)));
    }
    if !current.is_empty() {
        words.push(current);
    }
    Ok(words)
}

/// Drop a `[N]=` subscript from a `declare -p` array element
fn strip_index(word: &str) -> &str {
    if let Some(rest) = word.strip_prefix('[')
        && let Some(end) = rest.find("]=")
        && rest[..end].chars().all(|c| c.is_ascii_digit())
    {
        return &rest[end + 2..];
    }
    word
}

/// Remove shell quoting from one word
fn unquote(word: &str) -> Result<String> {
    let mut out = String::with_capacity(word.len());
    let mut chars = word.chars();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some('\''), '\'') => quote = None,
            (Some('\''), c) => out.push(c),
            (Some('"'), '"') => quote = None,
            (Some('"'), '\\') => match chars.next() {
                Some(n @ ('"' | '\\' | '$' | '`')) => out.push(n),
                Some(n) => {
                    out.push('\\');
                    out.push(n);
                }
                None => out.push('\\'),
            },
            (None, '\\') => {
                if let Some(n) = chars.next() {
                    out.push(n);
                }
            }
            (None, '"') | (None, '\'') => quote = Some(c),
            (_, c) => out.push(c),
        }
    }

    if quote.is_some() {
        return Err(Error::Parse(format!("Unterminated quote in '{}'", word)));
    }
    Ok(out)
}
