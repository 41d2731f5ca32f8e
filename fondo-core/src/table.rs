use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::extract::raw_value;

/// Display format attached to a column.
///
/// Formats are applied only when rendering; the stored cell value keeps its
/// raw precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnFormat {
    /// Fraction rendered as a percentage with two decimals (`0.07` -> `7.00%`).
    Percent,
    /// Number rendered with two decimals.
    Decimal,
    /// Verbatim text.
    Text,
}

/// A named column with its display format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column header.
    pub name: String,
    /// Rendering rule for the column's cells.
    pub format: ColumnFormat,
}

impl Column {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, format: ColumnFormat) -> Self {
        Self {
            name: name.into(),
            format,
        }
    }
}

/// A single stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// Raw numeric value.
    Num(f64),
    /// Verbatim text.
    Text(String),
    /// Present in the row but with no usable value.
    Empty,
}

impl Cell {
    /// Convert a JSON scalar, unwrapping `{"raw": …}` envelopes first.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match raw_value(value) {
            Value::Number(n) => n.as_f64().map_or(Self::Empty, Self::Num),
            Value::String(s) => Self::Text(s.clone()),
            Value::Bool(b) => Self::Text(b.to_string()),
            Value::Null => Self::Empty,
            other => Self::Text(other.to_string()),
        }
    }

    /// Parse a harvested page token.
    ///
    /// `"12.34%"` becomes the raw fraction `0.1234`, plain numerics (with
    /// thousands separators) become numbers, anything else stays text.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let t = token.trim();
        if t.is_empty() {
            return Self::Empty;
        }
        if let Some(stripped) = t.strip_suffix('%') {
            if let Ok(n) = stripped.trim().replace(',', "").parse::<f64>() {
                return Self::Num(n / 100.0);
            }
        }
        if let Ok(n) = t.replace(',', "").parse::<f64>() {
            return Self::Num(n);
        }
        Self::Text(t.to_string())
    }

    /// Numeric view of the stored value, if any.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// Text view of the stored value, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render under a column format. The stored value is untouched.
    #[must_use]
    pub fn render(&self, format: ColumnFormat) -> String {
        match (self, format) {
            (Self::Empty, _) => String::new(),
            (Self::Num(n), ColumnFormat::Percent) => format!("{:.2}%", n * 100.0),
            (Self::Num(n), ColumnFormat::Decimal) => format!("{n:.2}"),
            (Self::Num(n), ColumnFormat::Text) => n.to_string(),
            (Self::Text(s), _) => s.clone(),
        }
    }
}

/// How a token grid designates its header and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridHeader {
    /// Row 0 is a header row: its first cell names the index, the remaining
    /// cells name the value columns. Data rows start at row 1.
    FirstRow,
    /// No header row; every row is an index label followed by values.
    None,
}

/// The shapes upstream payloads arrive in, consumed by [`Table::build`].
///
/// Centralizing the dispatch here keeps the reshaping rules in one place
/// instead of scattering ad hoc transforms across call sites.
#[derive(Debug, Clone)]
pub enum TableSource {
    /// A list of records where `index_field` labels each row and the
    /// remaining fields become columns. `formats` overrides the inferred
    /// format per field name.
    Records {
        /// Field whose value becomes the row label.
        index_field: String,
        /// One JSON object per row.
        rows: Vec<Map<String, Value>>,
        /// Per-field format overrides.
        formats: Vec<(String, ColumnFormat)>,
    },
    /// Key/value pairs: each key a row label, the value the sole column.
    ScalarMap {
        /// Ordered label/value pairs.
        pairs: Vec<(String, Value)>,
        /// The single value column.
        column: Column,
    },
    /// A grid of text tokens, usually produced by [`crate::reshape::rows`].
    TokenGrid {
        /// Grid rows of equal width.
        rows: Vec<Vec<String>>,
        /// Header/index orientation of the grid.
        header: GridHeader,
        /// Naming and format for value columns (for [`GridHeader::FirstRow`]
        /// grids only the format is used; names come from the header row).
        column: Column,
    },
}

/// Normalized tabular output: ordered, labeled rows with typed cells.
///
/// Row order is insertion order of the source. Cells keep raw values;
/// formatting happens in [`Table::render`] and the `Display` impl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    index_label: String,
    columns: Vec<Column>,
    rows: Vec<(String, Vec<Cell>)>,
}

impl Table {
    /// A table with no columns and no rows.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            index_label: String::new(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Build a table from one of the recognized payload shapes.
    ///
    /// Always returns a table; empty input yields an empty table. Building
    /// twice from identical input yields identical tables.
    #[must_use]
    pub fn build(source: TableSource) -> Self {
        match source {
            TableSource::Records {
                index_field,
                rows,
                formats,
            } => Self::from_records(&index_field, &rows, &formats),
            TableSource::ScalarMap { pairs, column } => Self::from_pairs(pairs, column),
            TableSource::TokenGrid {
                rows,
                header,
                column,
            } => Self::from_grid(rows, header, column),
        }
    }

    fn from_records(
        index_field: &str,
        rows: &[Map<String, Value>],
        formats: &[(String, ColumnFormat)],
    ) -> Self {
        let mut columns: Vec<Column> = Vec::new();
        for row in rows {
            for (name, value) in row {
                if name == index_field || columns.iter().any(|c| &c.name == name) {
                    continue;
                }
                let format = formats
                    .iter()
                    .find(|(n, _)| n == name)
                    .map_or_else(|| infer_format(value), |(_, f)| *f);
                columns.push(Column {
                    name: name.clone(),
                    format,
                });
            }
        }
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(label) = row.get(index_field).map(scalar_label) else {
                continue;
            };
            let cells = columns
                .iter()
                .map(|c| row.get(&c.name).map_or(Cell::Empty, Cell::from_json))
                .collect();
            out.push((label, cells));
        }
        Self {
            index_label: index_field.to_string(),
            columns,
            rows: out,
        }
    }

    fn from_pairs(pairs: Vec<(String, Value)>, column: Column) -> Self {
        let rows = pairs
            .into_iter()
            .map(|(label, value)| (label, vec![Cell::from_json(&value)]))
            .collect();
        Self {
            index_label: String::new(),
            columns: vec![column],
            rows,
        }
    }

    fn from_grid(rows: Vec<Vec<String>>, header: GridHeader, column: Column) -> Self {
        match header {
            GridHeader::FirstRow => {
                let mut it = rows.into_iter();
                let Some(head) = it.next() else {
                    return Self::empty();
                };
                let mut head = head.into_iter();
                let index_label = head.next().unwrap_or_default();
                let columns: Vec<Column> = head
                    .map(|name| Column {
                        name,
                        format: column.format,
                    })
                    .collect();
                let rows = it
                    .filter_map(|row| {
                        let mut row = row.into_iter();
                        let label = row.next()?;
                        let mut cells: Vec<Cell> =
                            row.map(|t| Cell::from_token(&t)).collect();
                        cells.resize(columns.len(), Cell::Empty);
                        Some((label, cells))
                    })
                    .collect();
                Self {
                    index_label,
                    columns,
                    rows,
                }
            }
            GridHeader::None => {
                let rows = rows
                    .into_iter()
                    .filter_map(|row| {
                        let mut row = row.into_iter();
                        let label = row.next()?;
                        let value = row.next()?;
                        Some((label, vec![Cell::from_token(&value)]))
                    })
                    .collect();
                Self {
                    index_label: String::new(),
                    columns: vec![column],
                    rows,
                }
            }
        }
    }

    /// True when the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Name of the index (row-label) column.
    #[must_use]
    pub fn index_label(&self) -> &str {
        &self.index_label
    }

    /// Declared columns, in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Row labels in table order.
    pub fn row_labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(label, _)| label.as_str())
    }

    /// The stored cell at `(row, column)`, if both exist.
    #[must_use]
    pub fn get(&self, row: &str, column: &str) -> Option<&Cell> {
        let col = self.columns.iter().position(|c| c.name == column)?;
        self.rows
            .iter()
            .find(|(label, _)| label == row)
            .and_then(|(_, cells)| cells.get(col))
    }

    /// The cell at `(row, column)` rendered under its column format.
    #[must_use]
    pub fn render(&self, row: &str, column: &str) -> Option<String> {
        let (idx, col) = self
            .columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.name == column)?;
        self.rows
            .iter()
            .find(|(label, _)| label == row)
            .and_then(|(_, cells)| cells.get(idx))
            .map(|cell| cell.render(col.format))
    }
}

fn infer_format(value: &Value) -> ColumnFormat {
    match raw_value(value) {
        Value::Number(_) => ColumnFormat::Decimal,
        _ => ColumnFormat::Text,
    }
}

fn scalar_label(value: &Value) -> String {
    match raw_value(value) {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() && self.rows.is_empty() {
            return Ok(());
        }
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|(_, cells)| {
                self.columns
                    .iter()
                    .zip(cells)
                    .map(|(c, cell)| cell.render(c.format))
                    .collect()
            })
            .collect();
        let label_width = self
            .rows
            .iter()
            .map(|(label, _)| label.len())
            .chain(std::iter::once(self.index_label.len()))
            .max()
            .unwrap_or(0);
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.name.len()).collect();
        for row in &rendered {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.len());
            }
        }
        let index_label = &self.index_label;
        write!(f, "{index_label:<label_width$}")?;
        for (c, &width) in self.columns.iter().zip(&widths) {
            let name = &c.name;
            write!(f, "  {name:>width$}")?;
        }
        for ((label, _), cells) in self.rows.iter().zip(&rendered) {
            writeln!(f)?;
            write!(f, "{label:<label_width$}")?;
            for (cell, &width) in cells.iter().zip(&widths) {
                write!(f, "  {cell:>width$}")?;
            }
        }
        Ok(())
    }
}
