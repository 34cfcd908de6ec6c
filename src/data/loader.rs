// ============================================================
// Layer 4 — CSV Table Loader
// ============================================================
// Reads the interaction log and the auxiliary relation tables
// into a small column-addressed table.
//
// Why not deserialize straight into structs?
//   Each table has a different, partly dynamic schema (the FIR
//   table has any number of "rel*" columns) and a missing
//   column must produce an error that names both the file and
//   the column. Looking columns up by header gives us that.
//
// Encoding:
//   Cells are decoded as UTF-8 lossily. Some relation tables
//   are exported in a legacy Korean code page; the columns we
//   consume (ids, directions, scores) are plain ASCII.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use std::{fs::File, io::Read, path::Path};

use crate::domain::error::{PrepError, PrepResult};

/// Cell values pandas would read as NaN.
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// True when a cell holds no value.
pub fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

/// An in-memory CSV table with named columns.
#[derive(Debug, Clone)]
pub struct CsvTable {
    /// File path or label, used in error messages
    source:  String,
    headers: Vec<String>,
    rows:    Vec<Vec<String>>,
}

impl CsvTable {
    /// Read a CSV file with a header row.
    pub fn read(path: impl AsRef<Path>) -> PrepResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Reading table '{}'", path.display());
        let file = File::open(path)?;
        Self::from_reader(path.display().to_string(), file)
    }

    /// Read CSV from any reader; `source` labels the table in errors.
    pub fn from_reader<R: Read>(source: impl Into<String>, reader: R) -> PrepResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .byte_headers()?
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for record in rdr.byte_records() {
            let record = record?;
            let mut row: Vec<String> = record
                .iter()
                .map(|c| String::from_utf8_lossy(c).into_owned())
                .collect();
            // short rows read as trailing missing cells
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        let source = source.into();
        tracing::debug!("Loaded {} rows x {} columns from '{}'", rows.len(), headers.len(), source);
        Ok(Self { source, headers, rows })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Position of a column, or a missing-column error naming the file.
    pub fn column(&self, name: &str) -> PrepResult<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PrepError::MissingColumn {
                file:   self.source.clone(),
                column: name.to_string(),
            })
    }

    /// Positions of all columns whose header contains `fragment`,
    /// in header order.
    pub fn columns_containing(&self, fragment: &str) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.contains(fragment))
            .map(|(i, _)| i)
            .collect()
    }

    /// Every value of a column, in row order.
    pub fn column_values(&self, name: &str) -> PrepResult<Vec<&str>> {
        let col = self.column(name)?;
        Ok(self.rows.iter().map(|r| r[col].as_str()).collect())
    }

    /// Parse a cell as f64, reporting file, column and row on failure.
    pub fn parse_f64(&self, row: usize, col: usize) -> PrepResult<f64> {
        let cell = self.rows[row][col].trim();
        cell.parse::<f64>().map_err(|_| self.invalid(row, col))
    }

    /// Parse a cell as an integer; "1.0" is accepted as 1.
    pub fn parse_i64(&self, row: usize, col: usize) -> PrepResult<i64> {
        let value = self.parse_f64(row, col)?;
        if value.fract() != 0.0 || !value.is_finite() {
            return Err(self.invalid(row, col));
        }
        Ok(value as i64)
    }

    /// Invalid-value error for a specific cell.
    pub fn invalid(&self, row: usize, col: usize) -> PrepError {
        PrepError::InvalidValue {
            file:   self.source.clone(),
            column: self.headers[col].clone(),
            row,
            value:  self.rows[row][col].clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> CsvTable {
        CsvTable::from_reader("test.csv", csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_reads_headers_and_rows() {
        let t = table("a,b\n1,x\n2,y\n");
        assert_eq!(t.headers(), &["a", "b"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.column_values("b").unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn test_missing_column_names_file_and_column() {
        let t = table("a,b\n1,2\n");
        let err = t.column("kc_uid").unwrap_err();
        assert_eq!(err.to_string(), "The column 'kc_uid' was not found on test.csv");
    }

    #[test]
    fn test_short_rows_padded_as_missing() {
        let t = table("a,b,c\n1,2\n");
        assert!(is_missing(&t.rows()[0][2]));
    }

    #[test]
    fn test_parse_i64_accepts_float_form() {
        let t = table("acc\n1.0\n0.5\nyes\n");
        assert_eq!(t.parse_i64(0, 0).unwrap(), 1);
        assert!(matches!(t.parse_i64(1, 0), Err(PrepError::InvalidValue { .. })));
        assert!(matches!(t.parse_i64(2, 0), Err(PrepError::InvalidValue { row: 2, .. })));
    }

    #[test]
    fn test_columns_containing() {
        let t = table("target,auc,rel1,rel2,other\n");
        assert_eq!(t.columns_containing("rel"), vec![2, 3]);
    }

    #[test]
    fn test_missing_markers() {
        assert!(is_missing(" "));
        assert!(is_missing("NaN"));
        assert!(!is_missing("0"));
    }
}
