use crate::domain::{S5Error, S5Result};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_ZONE_FORMAT: &str = "POINT";

const ZONE_CONTEXT: &str = "zone line";

/// Logical grid shape declared by the `Zone` header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridDescriptor {
    pub title: String,
    pub zone_type: Option<String>,
    pub ni: usize,
    pub nj: usize,
    pub nk: usize,
    pub format: String,
}

impl Default for GridDescriptor {
    fn default() -> Self {
        Self {
            title: " ".to_string(),
            zone_type: None,
            ni: 1,
            nj: 1,
            nk: 1,
            format: DEFAULT_ZONE_FORMAT.to_string(),
        }
    }
}

impl GridDescriptor {
    pub fn new(
        title: impl Into<String>,
        ni: usize,
        nj: usize,
        nk: usize,
        format: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            zone_type: None,
            ni,
            nj,
            nk,
            format: format.into(),
        }
    }

    /// Parses `line` when present; a missing line yields the 1x1x1 point zone.
    pub fn from_optional_line(line: Option<&str>) -> S5Result<Self> {
        match line {
            Some(line) => Self::parse(line),
            None => Ok(Self::default()),
        }
    }

    /// Parses a zone line:
    /// `Zone T = "<title>", [ZONETYPE=<type>,] I = <ni>, J = <nj>, K = <nk>[, F = <format>]`.
    ///
    /// Whitespace is insignificant everywhere except inside the quoted title.
    pub fn parse(line: &str) -> S5Result<Self> {
        let open = line
            .find('"')
            .ok_or_else(|| zone_error(line, "missing quoted zone title"))?;
        let close = line
            .rfind('"')
            .filter(|close| *close > open)
            .ok_or_else(|| zone_error(line, "unterminated zone title"))?;

        if compact(&line[..open]) != "ZoneT=" {
            return Err(zone_error(line, "expected 'Zone T =' prefix"));
        }

        let title = line[open + 1..close].to_string();
        let tail = compact(&line[close + 1..]);
        let Some(fields) = tail.strip_prefix(',') else {
            return Err(zone_error(line, "missing I, J, K dimensions"));
        };

        let mut zone_type = None;
        let mut dimensions: [Option<usize>; 3] = [None; 3];
        let mut format = None;

        for segment in fields.split(',') {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| zone_error(line, format!("malformed segment '{segment}'")))?;
            match key {
                "ZONETYPE" => set_once(&mut zone_type, value.to_string(), key, line)?,
                "I" => set_once(&mut dimensions[0], parse_dimension(key, value, line)?, key, line)?,
                "J" => set_once(&mut dimensions[1], parse_dimension(key, value, line)?, key, line)?,
                "K" => set_once(&mut dimensions[2], parse_dimension(key, value, line)?, key, line)?,
                "F" => set_once(&mut format, value.to_string(), key, line)?,
                other => {
                    return Err(zone_error(line, format!("unsupported zone key '{other}'")));
                }
            }
        }

        let [Some(ni), Some(nj), Some(nk)] = dimensions else {
            return Err(zone_error(line, "missing I, J, K dimensions"));
        };
        if ni.checked_mul(nj).and_then(|cells| cells.checked_mul(nk)).is_none() {
            return Err(zone_error(line, format!("zone size {ni}*{nj}*{nk} overflows")));
        }

        let descriptor = Self {
            title,
            zone_type,
            ni,
            nj,
            nk,
            format: format.unwrap_or_else(|| DEFAULT_ZONE_FORMAT.to_string()),
        };
        debug!(zone = %descriptor, "parsed zone line");
        Ok(descriptor)
    }

    /// Canonical zone line. `ZONETYPE` is never written back.
    pub fn to_line(&self) -> String {
        format!(
            "Zone T = \"{}\", I = {}, J = {}, K = {}, F = {}",
            self.title, self.ni, self.nj, self.nk, self.format
        )
    }

    /// `I*J*K`, saturating at `usize::MAX` for hand-built descriptors.
    pub fn cell_count(&self) -> usize {
        self.ni.saturating_mul(self.nj).saturating_mul(self.nk)
    }
}

impl Display for GridDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_line())
    }
}

impl FromStr for GridDescriptor {
    type Err = S5Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        Self::parse(line)
    }
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn parse_dimension(key: &str, value: &str, line: &str) -> S5Result<usize> {
    match value.parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(zone_error(
            line,
            format!("dimension {key} must be a positive integer, got '{value}'"),
        )),
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, key: &str, line: &str) -> S5Result<()> {
    if slot.is_some() {
        return Err(zone_error(line, format!("duplicate zone key '{key}'")));
    }
    *slot = Some(value);
    Ok(())
}

fn zone_error(line: &str, message: impl Into<String>) -> S5Error {
    S5Error::format(
        ZONE_CONTEXT,
        format!("bad zone title format '{}': {}", line.trim(), message.into()),
    )
}
