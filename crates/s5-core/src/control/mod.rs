//! Line-preserving editor for the simulator's `key=value` control files.
//!
//! Lines keep their original terminators, so an untouched file is written
//! back byte-for-byte.

use crate::domain::{S5Error, S5Result};
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// `/` becomes a doubled backslash.
    Windows,
    /// Doubled backslashes become `/`.
    Unix,
}

impl FromStr for PathStyle {
    type Err = S5Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "win" | "dos" | "windows" => Ok(Self::Windows),
            "unix" | "linux" | "lin" => Ok(Self::Unix),
            other => Err(S5Error::format(
                "path style",
                format!("{other} is not a valid format"),
            )),
        }
    }
}

impl Display for PathStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Windows => f.write_str("windows"),
            Self::Unix => f.write_str("unix"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedTextConfig {
    lines: Vec<String>,
    source_path: Option<PathBuf>,
}

impl Default for KeyedTextConfig {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            source_path: None,
        }
    }
}

impl KeyedTextConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(str::to_string).collect(),
            source_path: None,
        }
    }

    pub fn read(path: impl AsRef<Path>) -> S5Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| S5Error::io(path, source))?;
        let mut config = Self::from_text(&text);
        config.source_path = Some(path.to_path_buf());
        debug!(path = %path.display(), lines = config.lines.len(), "read control file");
        Ok(config)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> S5Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_text()).map_err(|source| S5Error::io(path, source))?;
        info!(path = %path.display(), "wrote control file");
        Ok(())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn to_text(&self) -> String {
        self.lines.concat()
    }

    /// Trimmed text after the first `=` on the first line containing `key`.
    pub fn get_value(&self, key: &str) -> S5Result<String> {
        let line = self
            .lines
            .iter()
            .map(|line| line.trim())
            .find(|line| line.contains(key))
            .ok_or_else(|| self.missing(key))?;
        let (_, value) = line.split_once('=').ok_or_else(|| self.missing(key))?;
        if value.is_empty() {
            return Err(self.missing(key));
        }
        Ok(value.trim().to_string())
    }

    /// Replaces the value after the first `=` on the first line containing `key`.
    ///
    /// Surrounding whitespace and the line terminator are kept. Anything else
    /// after the `=`, such as a trailing comment, is part of the value and is
    /// overwritten.
    pub fn set_value(&mut self, key: &str, value: impl Display) -> S5Result<()> {
        let index = self
            .lines
            .iter()
            .position(|line| line.contains(key))
            .ok_or_else(|| self.missing(key))?;
        let line = &self.lines[index];

        let body_end = line.trim_end_matches(['\r', '\n']).len();
        let (body, terminator) = line.split_at(body_end);
        let equals = body.find('=').ok_or_else(|| self.missing(key))?;
        let (head, old_value) = body.split_at(equals + 1);
        if old_value.is_empty() {
            return Err(self.missing(key));
        }

        let leading = &old_value[..old_value.len() - old_value.trim_start().len()];
        let trailing = &old_value.trim_start()[old_value.trim().len()..];
        let updated = format!("{head}{leading}{value}{trailing}{terminator}");
        debug!(key, line = index + 1, "updated control value");
        self.lines[index] = updated;
        Ok(())
    }

    /// Rewrites path separators on every line for `style`.
    ///
    /// Single backslashes are left alone on the way to unix form.
    pub fn reformat(&mut self, style: PathStyle) {
        for line in &mut self.lines {
            *line = match style {
                PathStyle::Windows => line.replace('/', "\\\\"),
                PathStyle::Unix => line.replace("\\\\", "/"),
            };
        }
    }

    fn missing(&self, key: &str) -> S5Error {
        let context = self
            .source_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "control file".to_string());
        S5Error::not_found(key, context)
    }
}
