use crate::domain::{S5Error, S5Result};
use std::collections::BTreeSet;

pub const MIN_COLUMN_WIDTH: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Integer(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnData {
    /// Infers the narrowest column type that every token fits.
    pub fn infer(tokens: Vec<String>) -> Self {
        if let Ok(values) = tokens
            .iter()
            .map(|token| token.parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
        {
            return Self::Integer(values);
        }
        if let Ok(values) = tokens
            .iter()
            .map(|token| token.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
        {
            return Self::Float(values);
        }
        Self::Text(tokens)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Integer(values) => values.len(),
            Self::Float(values) => values.len(),
            Self::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric view of the column; `None` for text columns.
    pub fn as_f64(&self) -> Option<Vec<f64>> {
        match self {
            Self::Integer(values) => Some(values.iter().map(|value| *value as f64).collect()),
            Self::Float(values) => Some(values.clone()),
            Self::Text(_) => None,
        }
    }

    pub fn cell_text(&self, row: usize) -> Option<String> {
        match self {
            Self::Integer(values) => values.get(row).map(|value| value.to_string()),
            Self::Float(values) => values.get(row).map(|value| format_float(*value)),
            Self::Text(values) => values.get(row).cloned(),
        }
    }

    /// Rendered text of every cell, in row order.
    fn render_all(&self) -> Vec<String> {
        (0..self.len()).filter_map(|row| self.cell_text(row)).collect()
    }
}

/// Shortest round-trip float text that always carries a decimal point or exponent.
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Ordered, named columns of equal length. Row order is file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldTable {
    columns: Vec<Column>,
}

impl FieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns(columns: Vec<Column>) -> S5Result<Self> {
        let mut table = Self::new();
        for column in columns {
            table.push_column(column.name, column.data)?;
        }
        Ok(table)
    }

    /// Builds a table from whitespace-split rows, inferring each column's type.
    pub fn from_rows(names: &[String], rows: Vec<Vec<String>>) -> S5Result<Self> {
        let mut cells: Vec<Vec<String>> = vec![Vec::with_capacity(rows.len()); names.len()];
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != names.len() {
                return Err(S5Error::format(
                    "data block",
                    format!(
                        "row {} has {} fields, expected {}",
                        index + 1,
                        row.len(),
                        names.len()
                    ),
                ));
            }
            for (column, token) in cells.iter_mut().zip(row) {
                column.push(token);
            }
        }

        let columns = names
            .iter()
            .zip(cells)
            .map(|(name, tokens)| Column::new(name.clone(), ColumnData::infer(tokens)))
            .collect();
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn numeric_column(&self, name: &str) -> S5Result<Vec<f64>> {
        let column = self
            .column(name)
            .ok_or_else(|| S5Error::not_found(name, "table columns"))?;
        column.data.as_f64().ok_or_else(|| {
            S5Error::format("table columns", format!("column '{name}' is not numeric"))
        })
    }

    /// Number of distinct rendered values in a column.
    pub fn distinct_count(&self, name: &str) -> Option<usize> {
        let column = self.column(name)?;
        let distinct: BTreeSet<String> = column.data.render_all().into_iter().collect();
        Some(distinct.len())
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |column| column.data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.row_count() == 0
    }

    /// Appends a column, or replaces the data of an existing column in place.
    pub fn set_column(&mut self, name: impl Into<String>, data: ColumnData) -> S5Result<()> {
        let name = name.into();
        self.check_length(&name, &data)?;
        match self.columns.iter_mut().find(|column| column.name == name) {
            Some(column) => column.data = data,
            None => self.columns.push(Column::new(name, data)),
        }
        Ok(())
    }

    pub fn push_column(&mut self, name: impl Into<String>, data: ColumnData) -> S5Result<()> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(S5Error::format(
                "table columns",
                format!("duplicate column '{name}'"),
            ));
        }
        self.check_length(&name, &data)?;
        self.columns.push(Column::new(name, data));
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let index = self.columns.iter().position(|column| column.name == name)?;
        Some(self.columns.remove(index))
    }

    /// Reorders columns to `names`; every existing column must be named exactly once.
    pub fn reorder(&mut self, names: &[&str]) -> S5Result<()> {
        if names.len() != self.columns.len() {
            return Err(S5Error::format(
                "table columns",
                format!("expected {} column names, got {}", self.columns.len(), names.len()),
            ));
        }
        let mut reordered = Vec::with_capacity(names.len());
        for name in names {
            let column = self
                .remove_column(name)
                .ok_or_else(|| S5Error::not_found(*name, "table columns"))?;
            reordered.push(column);
        }
        self.columns = reordered;
        Ok(())
    }

    /// Right-aligned, single-space separated data block without header or index.
    pub fn render(&self) -> String {
        let rendered: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|column| column.data.render_all())
            .collect();
        let widths: Vec<usize> = rendered
            .iter()
            .map(|cells| {
                cells
                    .iter()
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(MIN_COLUMN_WIDTH)
            })
            .collect();

        let mut lines = Vec::with_capacity(self.row_count());
        for row in 0..self.row_count() {
            let line = rendered
                .iter()
                .zip(&widths)
                .map(|(cells, width)| format!("{:>width$}", cells[row], width = *width))
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(line);
        }
        lines.join("\n")
    }

    fn check_length(&self, name: &str, data: &ColumnData) -> S5Result<()> {
        let existing = self
            .columns
            .iter()
            .filter(|column| column.name != name)
            .map(|column| column.data.len())
            .next();
        match existing {
            Some(rows) if rows != data.len() => Err(S5Error::format(
                "table columns",
                format!("column '{name}' has {} rows, table has {rows}", data.len()),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnData, FieldTable, format_float};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn row(values: &[&str]) -> Vec<String> {
        names(values)
    }

    #[test]
    fn column_types_are_inferred_per_column() {
        let table = FieldTable::from_rows(
            &names(&["Distance (km)", "TargetVel (km/h)", "Site"]),
            vec![row(&["0", "69.0", "Darwin"]), row(&["3030", "1e-7", "Adelaide"])],
        )
        .expect("table");

        assert_eq!(table.columns()[0].data, ColumnData::Integer(vec![0, 3030]));
        assert_eq!(table.columns()[1].data, ColumnData::Float(vec![69.0, 1.0e-7]));
        assert!(matches!(table.columns()[2].data, ColumnData::Text(_)));
        assert_eq!(table.row_count(), 2);
        assert!(table.numeric_column("Site").is_err());
        assert!(table.numeric_column("Missing").is_err());
    }

    #[test]
    fn rows_with_wrong_field_count_are_rejected() {
        let error = FieldTable::from_rows(&names(&["a", "b"]), vec![row(&["1", "2"]), row(&["3"])])
            .expect_err("short row");
        assert!(error.to_string().contains("row 2 has 1 fields, expected 2"));
    }

    #[test]
    fn render_right_aligns_to_minimum_width() {
        let table = FieldTable::from_rows(
            &names(&["Distance (km)", "TargetVel (km/h)"]),
            vec![row(&["0", "69.0"]), row(&["3030", "69.0"])],
        )
        .expect("table");
        assert_eq!(table.render(), "     0   69.0\n  3030   69.0");
    }

    #[test]
    fn render_widens_columns_for_long_cells() {
        let table = FieldTable::from_rows(
            &names(&["a", "b"]),
            vec![row(&["1107080.5", "x"]), row(&["2.5", "longer-text"])],
        )
        .expect("table");
        assert_eq!(
            table.render(),
            "1107080.5           x\n      2.5 longer-text"
        );
    }

    #[test]
    fn float_format_is_round_trip_stable() {
        for value in [69.0, 0.001638, 1.0e-7, 888.2495, -17.3, 1.0e16] {
            let text = format_float(value);
            let reparsed: f64 = text.parse().expect("float");
            assert_eq!(reparsed, value);
            assert_eq!(format_float(reparsed), text);
        }
        assert_eq!(format_float(69.0), "69.0");
    }

    #[test]
    fn set_and_reorder_columns() {
        let mut table = FieldTable::from_rows(
            &names(&["x", "v"]),
            vec![row(&["0", "1.5"]), row(&["1", "2.5"])],
        )
        .expect("table");
        table
            .set_column("v", ColumnData::Float(vec![3.0, 4.0]))
            .expect("replace");
        table
            .set_column("w", ColumnData::Integer(vec![7, 8]))
            .expect("append");
        assert!(table.set_column("bad", ColumnData::Integer(vec![1])).is_err());
        assert!(table.push_column("x", ColumnData::Integer(vec![1, 2])).is_err());

        table.reorder(&["w", "x", "v"]).expect("reorder");
        assert_eq!(table.column_names(), vec!["w", "x", "v"]);
        assert_eq!(table.numeric_column("v").expect("v"), vec![3.0, 4.0]);
        assert!(table.reorder(&["w", "x"]).is_err());
    }

    #[test]
    fn distinct_count_uses_rendered_values() {
        let table = FieldTable::from_rows(
            &names(&["d"]),
            vec![row(&["1"]), row(&["2"]), row(&["1"])],
        )
        .expect("table");
        assert_eq!(table.distinct_count("d"), Some(2));
        assert_eq!(table.distinct_count("missing"), None);
    }
}
