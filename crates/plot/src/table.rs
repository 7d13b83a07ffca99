//! Delimited table reading
//!
//! Reads CSV-like or whitespace-separated table text into data points.
//! Rows whose selected cells are missing or non-numeric are skipped.

use crate::error::{PlotError, PlotResult};
use crate::model::{ColumnRef, DataPoint, TableDelimiter, TableOptions};

/// One accepted table row
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub point: DataPoint,
    pub label: Option<String>,
}

/// Parsed table contents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    /// Number of data rows dropped for missing or non-numeric cells
    pub skipped: usize,
}

impl Table {
    pub fn points(&self) -> Vec<DataPoint> {
        self.rows.iter().map(|row| row.point).collect()
    }
}

/// Read table text with the given options
pub fn parse_table(text: &str, options: &TableOptions) -> PlotResult<Table> {
    let records = read_records(text, options.delimiter)?;
    let mut records = records.into_iter().peekable();

    let has_header = match options.header {
        Some(flag) => flag,
        None => records.peek().map(|row| looks_like_header(row)).unwrap_or(false),
    };
    let headers: Vec<String> = if has_header {
        records.next().unwrap_or_default()
    } else {
        Vec::new()
    };

    let x_col = resolve_column(&options.x, &headers)?;
    let y_col = resolve_column(&options.y, &headers)?;
    let label_col = match &options.label {
        Some(column) => Some(resolve_column(column, &headers)?),
        None => None,
    };

    let mut table = Table {
        headers,
        ..Table::default()
    };
    for (line, record) in records.enumerate() {
        let x = record.get(x_col).and_then(|cell| parse_cell(cell));
        let y = record.get(y_col).and_then(|cell| parse_cell(cell));
        match (x, y) {
            (Some(x), Some(y)) => {
                let label = label_col
                    .and_then(|col| record.get(col))
                    .map(|cell| cell.to_string());
                table.rows.push(TableRow {
                    point: DataPoint::new(x, y),
                    label,
                });
            }
            _ => {
                tracing::debug!("Skipping table row {}: {:?}", line, record);
                table.skipped += 1;
            }
        }
    }
    Ok(table)
}

fn read_records(text: &str, delimiter: TableDelimiter) -> PlotResult<Vec<Vec<String>>> {
    let Some(byte) = delimiter.byte() else {
        return Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.split_whitespace().map(str::to_string).collect())
            .collect());
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(byte)
        .has_headers(false)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .flexible(true) // Allow records with varying number of fields
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}

fn parse_cell(cell: &str) -> Option<f64> {
    let value = cell.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// A first row with no numeric cell is taken as a header
fn looks_like_header(row: &[String]) -> bool {
    !row.is_empty() && row.iter().all(|cell| parse_cell(cell).is_none())
}

fn resolve_column(column: &ColumnRef, headers: &[String]) -> PlotResult<usize> {
    match column {
        ColumnRef::Index(index) => Ok(*index),
        ColumnRef::Name(name) => headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PlotError::Column(name.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_header() -> TableOptions {
        TableOptions {
            header: Some(false),
            ..TableOptions::default()
        }
    }

    #[test]
    fn test_malformed_row_is_skipped() {
        let table = parse_table("1,2\n3,4\n,5", &no_header()).unwrap();
        assert_eq!(
            table.points(),
            vec![DataPoint::new(1.0, 2.0), DataPoint::new(3.0, 4.0)]
        );
        assert_eq!(table.skipped, 1);
    }

    #[test]
    fn test_header_autodetect_and_named_columns() {
        let options = TableOptions {
            x: ColumnRef::Name("time".to_string()),
            y: ColumnRef::Name("value".to_string()),
            label: Some(ColumnRef::Name("tag".to_string())),
            ..TableOptions::default()
        };
        let text = "tag,time,value\na,0,1.5\nb,1,2.5\n";
        let table = parse_table(text, &options).unwrap();
        assert_eq!(table.headers, vec!["tag", "time", "value"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].point, DataPoint::new(1.0, 2.5));
        assert_eq!(table.rows[1].label.as_deref(), Some("b"));
    }

    #[test]
    fn test_unknown_column_name() {
        let options = TableOptions {
            y: ColumnRef::Name("missing".to_string()),
            ..TableOptions::default()
        };
        let result = parse_table("a,b\n1,2\n", &options);
        assert!(matches!(result, Err(PlotError::Column(name)) if name == "missing"));
    }

    #[test]
    fn test_whitespace_table() {
        let options = TableOptions {
            delimiter: TableDelimiter::Whitespace,
            ..TableOptions::default()
        };
        let text = "x  y\n# comment\n0 0\n1\t1\n\n2   4\n";
        let table = parse_table(text, &options).unwrap();
        assert_eq!(table.headers, vec!["x", "y"]);
        assert_eq!(table.points().len(), 3);
        assert_eq!(table.points()[2], DataPoint::new(2.0, 4.0));
    }

    #[test]
    fn test_semicolon_with_column_indices() {
        let options = TableOptions {
            header: Some(false),
            delimiter: TableDelimiter::Semicolon,
            x: ColumnRef::Index(2),
            y: ColumnRef::Index(0),
            label: None,
        };
        let table = parse_table("10;x;1\n20;y;2\n30;z", &options).unwrap();
        assert_eq!(
            table.points(),
            vec![DataPoint::new(1.0, 10.0), DataPoint::new(2.0, 20.0)]
        );
        assert_eq!(table.skipped, 1);
    }

    #[test]
    fn test_explicit_header_with_numeric_first_row() {
        let options = TableOptions {
            header: Some(true),
            ..TableOptions::default()
        };
        let table = parse_table("1,2\n3,4\n", &options).unwrap();
        assert_eq!(table.points(), vec![DataPoint::new(3.0, 4.0)]);
    }

    #[test]
    fn test_empty_table() {
        let table = parse_table("", &TableOptions::default()).unwrap();
        assert!(table.rows.is_empty());
    }
}
