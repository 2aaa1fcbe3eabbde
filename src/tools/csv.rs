//! Delimited text to spreadsheet conversion.
//!
//! The spreadsheet is HTML table markup with the Excel workbook namespace,
//! which spreadsheet applications open as a worksheet.

use super::{ToolInput, ToolOutput, ToolWidget};
use crate::catalog::ToolDescriptor;
use crate::id::now_ms;

const PREVIEW_ROWS: usize = 10;

/// Delimiters offered by the form.
pub const DELIMITERS: &[(char, &str)] = &[(',', "Comma"), ('\t', "Tab"), (';', "Semicolon"), ('|', "Pipe")];

pub struct CsvConverter {
    descriptor: ToolDescriptor,
    rows: Vec<Vec<String>>,
    has_header: bool,
}

impl CsvConverter {
    pub fn new(descriptor: ToolDescriptor) -> Self {
        Self {
            descriptor,
            rows: Vec::new(),
            has_header: false,
        }
    }

    /// Rows kept from the last successful conversion.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Split `text` into trimmed cells.
    ///
    /// Blank lines are dropped. A `"` toggles quoting and is itself removed;
    /// doubled quotes are not collapsed into one.
    pub fn parse(text: &str, delimiter: char) -> Vec<Vec<String>> {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let mut row = Vec::new();
                let mut current = String::new();
                let mut in_quotes = false;

                for c in line.chars() {
                    if c == '"' {
                        in_quotes = !in_quotes;
                    } else if c == delimiter && !in_quotes {
                        row.push(current.trim().to_string());
                        current.clear();
                    } else {
                        current.push(c);
                    }
                }
                row.push(current.trim().to_string());
                row
            })
            .collect()
    }

    fn delimiter(input: &ToolInput) -> Result<char, ToolOutput> {
        let raw = input.option("delimiter").unwrap_or(",");
        let delimiter = match raw {
            "\\t" | "tab" => '\t',
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => return Err(ToolOutput::error(format!("Unsupported delimiter '{}'", raw))),
                }
            }
        };
        if DELIMITERS.iter().any(|(d, _)| *d == delimiter) {
            Ok(delimiter)
        } else {
            Err(ToolOutput::error(format!("Unsupported delimiter '{}'", raw)))
        }
    }

    fn source_text(input: &ToolInput) -> String {
        if !input.text.trim().is_empty() {
            return input.text.trim().to_string();
        }
        input
            .files
            .first()
            .map(|f| String::from_utf8_lossy(&f.bytes).trim().to_string())
            .unwrap_or_default()
    }

    fn convert(&mut self, input: &ToolInput) -> ToolOutput {
        let text = Self::source_text(input);
        if text.is_empty() {
            return ToolOutput::error("Please upload a file or paste CSV data.");
        }

        let delimiter = match Self::delimiter(input) {
            Ok(d) => d,
            Err(out) => return out,
        };

        let rows = Self::parse(&text, delimiter);
        if rows.is_empty() {
            return ToolOutput::error("No data found in CSV.");
        }

        self.rows = rows;
        self.has_header = input.flag("header", true);

        let columns = self.rows.first().map(Vec::len).unwrap_or(0);
        ToolOutput::success(format!(
            "Conversion successful! {} rows, {} columns\n\n{}",
            self.rows.len(),
            columns,
            self.preview()
        ))
    }

    /// Plain-text table of the first rows.
    pub fn preview(&self) -> String {
        let shown = &self.rows[..self.rows.len().min(PREVIEW_ROWS)];
        let columns = shown.iter().map(Vec::len).max().unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|c| {
                shown
                    .iter()
                    .filter_map(|r| r.get(c))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let format_row = |row: &Vec<String>| -> String {
            widths
                .iter()
                .enumerate()
                .map(|(i, w)| format!("{:<width$}", row.get(i).map(String::as_str).unwrap_or(""), width = *w))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut lines = Vec::new();
        for (i, row) in shown.iter().enumerate() {
            lines.push(format_row(row));
            if i == 0 && self.has_header {
                lines.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
            }
        }

        if self.rows.len() > PREVIEW_ROWS {
            lines.push(String::new());
            lines.push(format!("Showing first {} rows of {} total rows", PREVIEW_ROWS, self.rows.len()));
        }
        lines.join("\n")
    }

    /// Spreadsheet markup for the converted rows.
    pub fn workbook(&self) -> String {
        let mut markup = String::from(concat!(
            "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" ",
            "xmlns:x=\"urn:schemas-microsoft-com:office:excel\" ",
            "xmlns=\"http://www.w3.org/TR/REC-html40\">\n",
            "<head>\n<meta charset=\"UTF-8\">\n",
            "<xml><x:ExcelWorkbook><x:ExcelWorksheets><x:ExcelWorksheet>",
            "<x:Name>Sheet1</x:Name>",
            "<x:WorksheetOptions><x:DisplayGridlines/></x:WorksheetOptions>",
            "</x:ExcelWorksheet></x:ExcelWorksheets></x:ExcelWorkbook></xml>\n",
            "<style>\n",
            "table { border-collapse: collapse; }\n",
            "th { background-color: #4472C4; color: white; font-weight: bold; padding: 8px; border: 1px solid #ccc; }\n",
            "td { padding: 8px; border: 1px solid #ccc; }\n",
            "</style>\n</head>\n<body>\n<table>"
        ));

        let mut body_rows = self.rows.iter();
        if self.has_header
            && let Some(header) = body_rows.next()
        {
            markup.push_str("<thead><tr>");
            for cell in header {
                markup.push_str(&format!("<th>{}</th>", escape_html(cell)));
            }
            markup.push_str("</tr></thead>");
        }

        markup.push_str("<tbody>");
        for row in body_rows {
            markup.push_str("<tr>");
            for cell in row {
                let style = if is_numeric(cell) { " style=\"mso-number-format:0.00\"" } else { "" };
                markup.push_str(&format!("<td{}>{}</td>", style, escape_html(cell)));
            }
            markup.push_str("</tr>");
        }
        markup.push_str("</tbody></table></body></html>");
        markup
    }

    fn export(&self) -> ToolOutput {
        if self.rows.is_empty() {
            return ToolOutput::error("No data to download. Please convert CSV first.");
        }
        let file_name = format!("converted_{}.xls", now_ms());
        ToolOutput::success(format!("Excel file saved as {}", file_name)).with_export(file_name, self.workbook())
    }
}

fn is_numeric(cell: &str) -> bool {
    let trimmed = cell.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok_and(|v| v.is_finite())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

impl ToolWidget for CsvConverter {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn actions(&self) -> &'static [&'static str] {
        &["convert", "export"]
    }

    fn run(&mut self, action: &str, input: &ToolInput) -> ToolOutput {
        match action {
            "convert" => self.convert(input),
            "export" => self.export(),
            _ => ToolOutput::unknown_action(&self.descriptor.name, action),
        }
    }
}
