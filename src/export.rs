//! CSV export
//!
//! One header row followed by one row per record, comma-separated and
//! newline-terminated. Fields containing a comma, a double quote, CR or LF
//! are wrapped in double quotes with inner quotes doubled.

/// A record that can be written as one CSV row
pub trait CsvRecord {
    /// Column names, in row order
    fn csv_header() -> &'static [&'static str];

    /// Cell values, same length and order as [`csv_header`](Self::csv_header)
    fn csv_row(&self) -> Vec<String>;
}

/// Render `records` as a CSV document
pub fn to_csv<T: CsvRecord>(records: &[T]) -> String {
    let mut out = String::new();
    push_line(&mut out, T::csv_header().iter().copied());
    for record in records {
        let row = record.csv_row();
        push_line(&mut out, row.iter().map(String::as_str));
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(cell));
    }
    out.push('\n');
}

/// Quote a single cell if it needs it
pub fn escape_field(value: &str) -> std::borrow::Cow<'_, str> {
    if value.contains([',', '"', '\r', '\n']) {
        std::borrow::Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        std::borrow::Cow::Borrowed(value)
    }
}

/// Format a money or quantity value without trailing noise
pub(crate) fn number_cell(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(&'static str, f64);

    impl CsvRecord for Row {
        fn csv_header() -> &'static [&'static str] {
            &["Name", "Amount"]
        }

        fn csv_row(&self) -> Vec<String> {
            vec![self.0.to_string(), number_cell(self.1)]
        }
    }

    #[test]
    fn test_one_header_and_one_row_per_record() {
        let rows = vec![Row("cement", 10.0), Row("steel", 2.5), Row("sand", 0.0)];
        let csv = to_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), rows.len() + 1);
        assert_eq!(lines[0], "Name,Amount");
        assert_eq!(lines[1], "cement,10");
        assert_eq!(lines[2], "steel,2.5");
        assert!(csv.ends_with('\n'));
    }

    #[test]
    fn test_empty_export_has_only_header() {
        let csv = to_csv::<Row>(&[]);
        assert_eq!(csv, "Name,Amount\n");
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("Acme, Inc."), "\"Acme, Inc.\"");
        assert_eq!(escape_field("6\" pipe"), "\"6\"\" pipe\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_comma_in_cell_keeps_column_count() {
        let csv = to_csv(&[Row("Acme, Inc.", 1.0)]);
        assert_eq!(csv.lines().nth(1), Some("\"Acme, Inc.\",1"));
    }
}
