use super::table::FieldTable;
use super::zone::GridDescriptor;
use crate::domain::{Diagnostic, DiagnosticCode, S5Error, S5Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const TITLE_PREFIX: &str = "Title = ";
const VARIABLES_PREFIX: &str = "Variables = ";
const AMBIENT_PREFIX: &str = "#PAtm(Pa) TAtm(K)= ";
const DATUM_PREFIX: &str = "#Datums= ";
const ZONE_PREFIX: &str = "Zone ";

/// Titled, zone-tagged table as read from or written to a field-document file.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDocument {
    pub title: String,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub datum: Vec<String>,
    pub zone: GridDescriptor,
    pub data: FieldTable,
    pub source_path: Option<PathBuf>,
}

impl Default for FieldDocument {
    fn default() -> Self {
        Self {
            title: "Title".to_string(),
            pressure: None,
            temperature: None,
            datum: vec!["Datum".to_string()],
            zone: GridDescriptor::default(),
            data: FieldTable::new(),
            source_path: None,
        }
    }
}

/// Outcome of comparing the zone dimensions against the table row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneCheck {
    pub expected_rows: usize,
    pub actual_rows: usize,
    pub diagnostic: Option<Diagnostic>,
}

impl ZoneCheck {
    pub fn is_consistent(&self) -> bool {
        self.diagnostic.is_none()
    }
}

impl FieldDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps `data` in a document whose zone is the 1-D row count of the table.
    pub fn from_table(title: impl Into<String>, data: FieldTable) -> Self {
        let mut document = Self {
            title: title.into(),
            data,
            ..Self::default()
        };
        document.update_zone_to_row_count();
        document
    }

    pub fn read(path: impl AsRef<Path>) -> S5Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| S5Error::io(path, source))?;
        let mut document = Self::parse_str(&source, &path.display().to_string())?;
        document.source_path = Some(path.to_path_buf());
        info!(path = %path.display(), rows = document.data.row_count(), "read field document");
        Ok(document)
    }

    /// Parses field-document text; `context` names the source in error messages.
    pub fn parse_str(source: &str, context: &str) -> S5Result<Self> {
        let mut lines = source.lines();
        let mut document = Self::default();

        document.title = lines
            .next()
            .and_then(|line| non_empty_suffix(line, TITLE_PREFIX))
            .map(|title| title.trim_matches('"').to_string())
            .ok_or_else(|| S5Error::format(context, "missing title"))?;

        let variables = lines
            .next()
            .and_then(|line| non_empty_suffix(line, VARIABLES_PREFIX))
            .ok_or_else(|| S5Error::format(context, "missing variable titles"))?;
        let names = parse_variable_names(variables);
        debug!(title = %document.title, columns = names.len(), "parsed title block");

        loop {
            let line = lines
                .next()
                .ok_or_else(|| S5Error::format(context, "missing zone data"))?;

            if let Some(values) = non_empty_suffix(line, AMBIENT_PREFIX) {
                let (pressure, temperature) = parse_ambient(values, context)?;
                document.pressure = Some(pressure);
                document.temperature = Some(temperature);
                continue;
            }

            if let Some(labels) = non_empty_suffix(line, DATUM_PREFIX) {
                document.datum = labels.split(' ').map(str::to_string).collect();
                continue;
            }

            if non_empty_suffix(line, ZONE_PREFIX).is_some() {
                document.zone = GridDescriptor::parse(line)?;
                break;
            }

            return Err(S5Error::format(context, "missing zone data"));
        }

        let rows = lines
            .map(|line| {
                line.split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|tokens| !tokens.is_empty())
            .collect();
        document.data = FieldTable::from_rows(&names, rows)
            .map_err(|error| S5Error::format(context, error.to_string()))?;

        Ok(document)
    }

    /// Renders the document text exactly as [`FieldDocument::write`] stores it.
    pub fn to_text(&self, include_datum: bool) -> S5Result<String> {
        if self.data.is_empty() {
            return Err(S5Error::state("no valid data to export"));
        }

        let variables = self
            .data
            .column_names()
            .iter()
            .map(|name| format!("\"{name}\""))
            .collect::<Vec<_>>()
            .join(", ");

        let mut text = String::new();
        text.push_str(&format!("{TITLE_PREFIX}\"{}\"\n", self.title));
        text.push_str(&format!("{VARIABLES_PREFIX}{variables}\n"));
        if include_datum {
            text.push_str(&format!(
                "{AMBIENT_PREFIX}{} {}\n",
                self.pressure.unwrap_or(0.0),
                self.temperature.unwrap_or(0.0)
            ));
            text.push_str(&format!("{DATUM_PREFIX}{}\n", self.datum.join(" ")));
        }
        text.push_str(&self.zone.to_line());
        text.push('\n');
        text.push_str(&self.data.render());
        Ok(text)
    }

    /// Writes the document, returning any non-fatal zone diagnostics.
    pub fn write(&self, path: impl AsRef<Path>, include_datum: bool) -> S5Result<Vec<Diagnostic>> {
        let path = path.as_ref();
        let text = self.to_text(include_datum).map_err(|error| match error {
            S5Error::State { message } => {
                S5Error::state(format!("{message} for '{}'", path.display()))
            }
            other => other,
        })?;

        let check = self.check_zone_consistency();
        fs::write(path, text).map_err(|source| S5Error::io(path, source))?;
        info!(path = %path.display(), rows = self.data.row_count(), "wrote field document");

        Ok(check.diagnostic.into_iter().collect())
    }

    /// Sets `ni` to the row count. `nj` and `nk` are left as they are.
    pub fn update_zone_to_row_count(&mut self) {
        self.zone.ni = self.data.row_count();
    }

    pub fn check_zone_consistency(&self) -> ZoneCheck {
        let expected_rows = self.zone.cell_count();
        let actual_rows = self.data.row_count();
        let diagnostic = (expected_rows != actual_rows).then(|| {
            Diagnostic::emit(
                DiagnosticCode::ZoneMismatch,
                format!(
                    "Zone detail mismatch: I*J*K = {expected_rows} but table has {actual_rows} rows"
                ),
            )
        });

        ZoneCheck {
            expected_rows,
            actual_rows,
            diagnostic,
        }
    }
}

fn non_empty_suffix<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix).filter(|rest| !rest.is_empty())
}

fn parse_variable_names(list: &str) -> Vec<String> {
    list.trim_matches('"')
        .split("\", \"")
        .map(str::to_string)
        .collect()
}

fn parse_ambient(values: &str, context: &str) -> S5Result<(f64, f64)> {
    let mut tokens = values.split(' ');
    let mut next_value = |label: &str| -> S5Result<f64> {
        let token = tokens.next().unwrap_or_default();
        token.parse::<f64>().map_err(|_| {
            S5Error::format(
                context,
                format!("invalid ambient {label} '{token}' in '{AMBIENT_PREFIX}{values}'"),
            )
        })
    };
    let pressure = next_value("pressure")?;
    let temperature = next_value("temperature")?;
    Ok((pressure, temperature))
}
