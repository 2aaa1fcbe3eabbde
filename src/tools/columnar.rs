//! Columnar data file viewer.
//!
//! Files are decoded through [`ColumnarDecoder`]. The bundled decoder does not
//! read the binary format: it returns a fixed demonstration table so the
//! viewer can be exercised end to end.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use log::{debug, warn};
use serde_json::{Map, Value};

use super::{InputFile, ToolInput, ToolOutput, ToolWidget};
use crate::catalog::ToolDescriptor;
use crate::error::{DevhubError, Result};

/// One column of a decoded table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Schema plus row values aligned to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

impl DecodedTable {
    /// Rows as JSON objects keyed by column name.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row.iter())
                    .map(|(c, v)| (c.name.clone(), v.clone()))
                    .collect()
            })
            .collect()
    }
}

/// Decodes file bytes into a table.
pub trait ColumnarDecoder: Send + Sync {
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<DecodedTable>;
}

/// Decoder producing a 5 x 100 table of sample users for any non-empty input.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockColumnarDecoder;

impl ColumnarDecoder for MockColumnarDecoder {
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<DecodedTable> {
        debug!("Mock decoding {} ({} bytes)", name, bytes.len());
        if bytes.is_empty() {
            return Err(DevhubError::Decode(format!("{} is empty", name)));
        }

        let columns = vec![
            Column::new("id", "int64"),
            Column::new("name", "string"),
            Column::new("age", "int32"),
            Column::new("email", "string"),
            Column::new("created_at", "timestamp"),
        ];

        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();
        let rows = (0..100i64)
            .map(|i| {
                let created = start + Duration::days(i);
                vec![
                    Value::from(i + 1),
                    Value::from(format!("User {}", i + 1)),
                    Value::from(20 + (i % 50)),
                    Value::from(format!("user{}@example.com", i + 1)),
                    Value::from(created.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
                ]
            })
            .collect();

        Ok(DecodedTable { columns, rows })
    }
}

/// Rows shown per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Ten,
    Fifty,
    Hundred,
    All,
}

impl PageSize {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "10" => Some(Self::Ten),
            "50" => Some(Self::Fifty),
            "100" => Some(Self::Hundred),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Nearest page size for a configured row count.
    pub fn from_rows(rows: usize) -> Self {
        match rows {
            0 => Self::All,
            1..=10 => Self::Ten,
            11..=50 => Self::Fifty,
            _ => Self::Hundred,
        }
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Ten => Some(10),
            Self::Fifty => Some(50),
            Self::Hundred => Some(100),
            Self::All => None,
        }
    }
}

struct LoadedFile {
    name: String,
    bytes: Vec<u8>,
}

pub struct ColumnarViewer {
    descriptor: ToolDescriptor,
    decoder: Arc<dyn ColumnarDecoder>,
    default_page: PageSize,
    files: Vec<LoadedFile>,
    current: Option<(usize, DecodedTable)>,
}

impl ColumnarViewer {
    pub fn new(descriptor: ToolDescriptor, decoder: Arc<dyn ColumnarDecoder>, default_page: PageSize) -> Self {
        Self {
            descriptor,
            decoder,
            default_page,
            files: Vec::new(),
            current: None,
        }
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn selected(&self) -> Option<usize> {
        self.current.as_ref().map(|(i, _)| *i)
    }

    pub fn table(&self) -> Option<&DecodedTable> {
        self.current.as_ref().map(|(_, t)| t)
    }

    fn load(&mut self, files: &[InputFile]) -> ToolOutput {
        if files.is_empty() {
            return ToolOutput::error("Please choose one or more files to load.");
        }

        let first_new = self.files.len();
        self.files.extend(files.iter().map(|f| LoadedFile {
            name: f.name.clone(),
            bytes: f.bytes.clone(),
        }));

        // The first file is shown right away
        let shown = if self.current.is_none() { 0 } else { first_new };
        match self.select(shown) {
            Ok(summary) => ToolOutput::success(format!(
                "{} file(s) loaded successfully!\n\n{}",
                files.len(),
                summary
            )),
            Err(out) => out,
        }
    }

    fn select(&mut self, index: usize) -> std::result::Result<String, ToolOutput> {
        let Some(file) = self.files.get(index) else {
            return Err(ToolOutput::error(format!("No file at index {}", index)));
        };

        match self.decoder.decode(&file.name, &file.bytes) {
            Ok(table) => {
                let summary = format!(
                    "{} loaded successfully! {} columns, {} rows",
                    file.name,
                    table.columns.len(),
                    table.rows.len()
                );
                self.current = Some((index, table));
                Ok(summary)
            }
            Err(e) => {
                warn!("Failed to decode {}: {}", file.name, e);
                Err(ToolOutput::error(format!("Error parsing file: {}", e)))
            }
        }
    }

    fn remove(&mut self, index: usize) -> ToolOutput {
        if index >= self.files.len() {
            return ToolOutput::error(format!("No file at index {}", index));
        }
        let removed = self.files.remove(index);

        self.current = match self.current.take() {
            Some((i, _)) if i == index => None,
            Some((i, table)) if i > index => Some((i - 1, table)),
            other => other,
        };

        ToolOutput::success(format!("Removed {}\n\n{}", removed.name, self.list_files()))
    }

    fn list_files(&self) -> String {
        if self.files.is_empty() {
            return "No files loaded".to_string();
        }
        let mut lines = vec![format!("Uploaded files ({})", self.files.len())];
        for (i, file) in self.files.iter().enumerate() {
            let marker = if self.selected() == Some(i) { "*" } else { " " };
            lines.push(format!(
                "{} [{}] {} ({})",
                marker,
                i,
                file.name,
                format_file_size(file.bytes.len() as u64)
            ));
        }
        lines.join("\n")
    }

    fn schema(&self) -> ToolOutput {
        let Some(table) = self.table() else {
            return ToolOutput::error("No data to show. Please load a Parquet file first.");
        };
        let rows: Vec<Vec<String>> = table
            .columns
            .iter()
            .map(|c| vec![c.name.clone(), c.data_type.clone()])
            .collect();
        ToolOutput::success(text_table(&["Column", "Type"], &rows))
    }

    fn rows(&self, input: &ToolInput) -> ToolOutput {
        let Some(table) = self.table() else {
            return ToolOutput::error("No data to show. Please load a Parquet file first.");
        };

        let page_size = match input.option("rows") {
            Some(raw) => match PageSize::parse(raw) {
                Some(size) => size,
                None => return ToolOutput::error("Rows to show must be 10, 50, 100 or all"),
            },
            None => self.default_page,
        };
        let page = match input.option("page").map(|p| p.trim().parse::<usize>()) {
            Some(Ok(p)) if p >= 1 => p,
            Some(_) => return ToolOutput::error("Page must be a positive number"),
            None => 1,
        };

        let total = table.rows.len();
        let (start, end) = match page_size.limit() {
            Some(limit) => match (page - 1).checked_mul(limit) {
                Some(start) if start < total || page == 1 => (start, (start + limit).min(total)),
                _ => return ToolOutput::error(format!("Page {} is out of range", page)),
            },
            None => (0, total),
        };

        let headers: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        let cells: Vec<Vec<String>> = table.rows[start..end]
            .iter()
            .map(|row| row.iter().map(display_value).collect())
            .collect();

        let mut text = text_table(&headers, &cells);
        if end - start < total {
            text.push_str(&format!("\n\nShowing rows {}-{} of {}", start + 1, end, total));
        }
        ToolOutput::success(text)
    }

    fn export_stem(&self) -> String {
        self.selected()
            .and_then(|i| self.files.get(i))
            .map(|f| f.name.replacen(".parquet", "", 1).replacen(".parq", "", 1))
            .unwrap_or_else(|| "data".to_string())
    }

    fn export_csv(&self) -> ToolOutput {
        let Some(table) = self.table() else {
            return ToolOutput::error("No data to export. Please load a Parquet file first.");
        };
        let file_name = format!("{}.csv", self.export_stem());
        ToolOutput::success("CSV exported successfully!").with_export(file_name, to_csv(table))
    }

    fn export_json(&self) -> ToolOutput {
        let Some(table) = self.table() else {
            return ToolOutput::error("No data to export. Please load a Parquet file first.");
        };
        match serde_json::to_string_pretty(&table.records()) {
            Ok(json) => {
                let file_name = format!("{}.json", self.export_stem());
                ToolOutput::success("JSON exported successfully!").with_export(file_name, json)
            }
            Err(e) => ToolOutput::error(format!("Export error: {}", e)),
        }
    }

    fn index_option(input: &ToolInput) -> std::result::Result<usize, ToolOutput> {
        let raw = input.option("index").unwrap_or(input.text.as_str());
        raw.trim()
            .parse::<usize>()
            .map_err(|_| ToolOutput::error("Please provide a file index"))
    }
}

/// Human-readable size: bytes, then KB and MB with two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < KB * KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / (KB * KB) as f64)
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn csv_field(value: &Value) -> String {
    let text = match value {
        Value::Null => return String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.contains(',') || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

fn to_csv(table: &DecodedTable) -> String {
    let mut lines = vec![
        table
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(","),
    ];
    for row in &table.rows {
        lines.push(row.iter().map(csv_field).collect::<Vec<_>>().join(","));
    }
    lines.join("\n")
}

fn text_table<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.as_ref().chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.iter().map(|h| h.as_ref()).collect())];
    out.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

impl ToolWidget for ColumnarViewer {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn actions(&self) -> &'static [&'static str] {
        &["load", "files", "select", "remove", "schema", "rows", "export-csv", "export-json"]
    }

    fn run(&mut self, action: &str, input: &ToolInput) -> ToolOutput {
        match action {
            "load" => self.load(&input.files),
            "files" => ToolOutput::success(self.list_files()),
            "select" => match Self::index_option(input) {
                Ok(index) => match self.select(index) {
                    Ok(summary) => ToolOutput::success(summary),
                    Err(out) => out,
                },
                Err(out) => out,
            },
            "remove" => match Self::index_option(input) {
                Ok(index) => self.remove(index),
                Err(out) => out,
            },
            "schema" => self.schema(),
            "rows" => self.rows(input),
            "export-csv" => self.export_csv(),
            "export-json" => self.export_json(),
            _ => ToolOutput::unknown_action(&self.descriptor.name, action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DevhubError;

    fn widget() -> ColumnarViewer {
        ColumnarViewer::new(
            ToolDescriptor::new("parquet-viewer", "Parquet Viewer"),
            Arc::new(MockColumnarDecoder),
            PageSize::Fifty,
        )
    }

    fn load(w: &mut ColumnarViewer, names: &[&str]) -> ToolOutput {
        let mut input = ToolInput::new();
        for name in names {
            input = input.with_file(InputFile::new(*name, vec![0u8; 2048]));
        }
        w.run("load", &input)
    }

    #[test]
    fn test_mock_table_shape() {
        let table = MockColumnarDecoder.decode("x.parquet", b"PAR1").unwrap();
        assert_eq!(table.columns.len(), 5);
        assert_eq!(table.rows.len(), 100);
        assert_eq!(table.rows[0][1], Value::from("User 1"));
        assert_eq!(table.rows[99][0], Value::from(100));
        assert_eq!(table.rows[50][2], Value::from(20));
        assert_eq!(table.rows[0][4], Value::from("2024-01-01T00:00:00.000Z"));
        assert_eq!(table.rows[31][4], Value::from("2024-02-01T00:00:00.000Z"));
    }

    #[test]
    fn test_load_selects_first() {
        let mut w = widget();
        let out = load(&mut w, &["a.parquet", "b.parquet"]);
        assert!(!out.is_error);
        assert!(out.content.starts_with("2 file(s) loaded successfully!"));
        assert_eq!(w.selected(), Some(0));
        assert_eq!(w.file_names(), vec!["a.parquet", "b.parquet"]);
    }

    #[test]
    fn test_load_requires_files() {
        assert!(widget().run("load", &ToolInput::new()).is_error);
    }

    #[test]
    fn test_schema() {
        let mut w = widget();
        assert!(w.run("schema", &ToolInput::new()).is_error);
        load(&mut w, &["a.parquet"]);
        let out = w.run("schema", &ToolInput::new());
        assert!(out.content.contains("created_at | timestamp"));
    }

    #[test]
    fn test_rows_default_page() {
        let mut w = widget();
        load(&mut w, &["a.parquet"]);
        let out = w.run("rows", &ToolInput::new());
        assert!(out.content.contains("Showing rows 1-50 of 100"));
        assert!(out.content.contains("user50@example.com"));
        assert!(!out.content.contains("user51@example.com"));
    }

    #[test]
    fn test_rows_second_page_of_ten() {
        let mut w = widget();
        load(&mut w, &["a.parquet"]);
        let out = w.run("rows", &ToolInput::new().with_option("rows", "10").with_option("page", "2"));
        assert!(out.content.contains("User 11"));
        assert!(out.content.contains("Showing rows 11-20 of 100"));
    }

    #[test]
    fn test_rows_all() {
        let mut w = widget();
        load(&mut w, &["a.parquet"]);
        let out = w.run("rows", &ToolInput::new().with_option("rows", "all"));
        assert!(out.content.contains("User 100"));
        assert!(!out.content.contains("Showing rows"));
    }

    #[test]
    fn test_rows_page_past_end() {
        let mut w = widget();
        load(&mut w, &["a.parquet"]);
        let out = w.run("rows", &ToolInput::new().with_option("rows", "10").with_option("page", "11"));
        assert!(out.is_error);
        assert!(out.content.contains("out of range"));

        let out = w.run("rows", &ToolInput::new().with_option("page", usize::MAX.to_string()));
        assert!(out.is_error);
        assert!(!w.run("rows", &ToolInput::new().with_option("page", "2")).is_error);
    }

    #[test]
    fn test_rows_bad_size() {
        let mut w = widget();
        load(&mut w, &["a.parquet"]);
        assert!(w.run("rows", &ToolInput::new().with_option("rows", "25")).is_error);
    }

    #[test]
    fn test_remove_adjusts_selection() {
        let mut w = widget();
        load(&mut w, &["a.parquet", "b.parquet"]);
        w.run("select", &ToolInput::new().with_option("index", "1"));
        w.run("remove", &ToolInput::text("0"));
        assert_eq!(w.selected(), Some(0));
        assert_eq!(w.file_names(), vec!["b.parquet"]);

        w.run("remove", &ToolInput::text("0"));
        assert!(w.selected().is_none());
        assert!(w.run("rows", &ToolInput::new()).is_error);
    }

    #[test]
    fn test_remove_bad_index() {
        let mut w = widget();
        assert!(w.run("remove", &ToolInput::text("3")).is_error);
        assert!(w.run("remove", &ToolInput::text("x")).is_error);
    }

    #[test]
    fn test_files_listing() {
        let mut w = widget();
        load(&mut w, &["a.parquet"]);
        let out = w.run("files", &ToolInput::new());
        assert!(out.content.contains("* [0] a.parquet (2.00 KB)"));
    }

    #[test]
    fn test_export_csv() {
        let mut w = widget();
        assert!(w.run("export-csv", &ToolInput::new()).is_error);
        load(&mut w, &["users.parquet"]);
        let export = w.run("export-csv", &ToolInput::new()).export.unwrap();
        assert_eq!(export.file_name, "users.csv");
        let csv = String::from_utf8(export.bytes).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,name,age,email,created_at"));
        assert_eq!(lines.next(), Some("1,User 1,20,user1@example.com,2024-01-01T00:00:00.000Z"));
        assert_eq!(csv.lines().count(), 101);
    }

    #[test]
    fn test_export_json() {
        let mut w = widget();
        load(&mut w, &["events.parq"]);
        let export = w.run("export-json", &ToolInput::new()).export.unwrap();
        assert_eq!(export.file_name, "events.json");
        let parsed: Vec<Map<String, Value>> = serde_json::from_slice(&export.bytes).unwrap();
        assert_eq!(parsed.len(), 100);
        assert_eq!(parsed[0]["email"], "user1@example.com");
        assert_eq!(parsed[0].keys().next().map(String::as_str), Some("id"));
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field(&Value::from("plain")), "plain");
        assert_eq!(csv_field(&Value::from("a,b")), "\"a,b\"");
        assert_eq!(csv_field(&Value::from("say \"hi\"")), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field(&Value::from("two\nlines")), "\"two\nlines\"");
        assert_eq!(csv_field(&Value::Null), "");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_page_size() {
        assert_eq!(PageSize::parse("ALL"), Some(PageSize::All));
        assert_eq!(PageSize::parse("7"), None);
        assert_eq!(PageSize::from_rows(50), PageSize::Fifty);
        assert_eq!(PageSize::from_rows(0), PageSize::All);
    }

    struct BrokenDecoder;

    impl ColumnarDecoder for BrokenDecoder {
        fn decode(&self, _name: &str, _bytes: &[u8]) -> Result<DecodedTable> {
            Err(DevhubError::Decode("not a columnar file".to_string()))
        }
    }

    #[test]
    fn test_decode_failure_is_inline() {
        let mut w = ColumnarViewer::new(
            ToolDescriptor::new("parquet-viewer", "Parquet Viewer"),
            Arc::new(BrokenDecoder),
            PageSize::Ten,
        );
        let out = load(&mut w, &["bad.parquet"]);
        assert!(out.is_error);
        assert!(out.content.contains("not a columnar file"));
        assert!(w.selected().is_none());
    }

    #[test]
    fn test_mock_rejects_empty_file() {
        let err = MockColumnarDecoder.decode("empty.parquet", &[]).unwrap_err();
        assert!(matches!(err, DevhubError::Decode(_)));

        let mut w = widget();
        let out = w.run("load", &ToolInput::new().with_file(InputFile::new("empty.parquet", Vec::new())));
        assert!(out.is_error);
        assert!(out.content.contains("empty.parquet is empty"));
    }
}
