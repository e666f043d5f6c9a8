//! Output formatting utilities

use crate::error::CliResult;
use colored::*;
use consent_document::ListRow;
use consent_export::{Notice, Notifier};
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Print a vector of items in the specified format
pub fn print_output<T: Serialize + Tabled>(
    data: Vec<T>,
    format: OutputFormat,
    empty: &str,
) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                println!("{}", empty.dimmed());
            } else {
                println!("{}", Table::new(data));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&data)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&data)?),
    }
    Ok(())
}

/// Print a single item as JSON or YAML
pub fn print_single<T: Serialize>(data: &T, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?)
        }
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(data)?),
    }
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Shows export and print notices on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        print_error(notice.message());
    }
}

/// One line of `consent list`.
#[derive(Debug, Serialize, Tabled)]
pub struct RecordRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "标题")]
    pub title: String,
    #[tabled(rename = "日期")]
    pub date: String,
    #[tabled(rename = "参与方")]
    pub parties: String,
    #[tabled(rename = "签署")]
    pub signed: String,
    #[tabled(rename = "创建于")]
    pub created: String,
}

fn mark(signed: bool) -> &'static str {
    if signed {
        "✓"
    } else {
        "·"
    }
}

impl From<ListRow> for RecordRow {
    fn from(row: ListRow) -> Self {
        Self {
            signed: format!("A{} B{}", mark(row.party_a_signed), mark(row.party_b_signed)),
            id: row.id.to_string(),
            title: row.title,
            date: row.date,
            parties: row.parties,
            created: row.created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consent_types::RecordId;

    #[test]
    fn test_output_format_default() {
        assert!(matches!(OutputFormat::default(), OutputFormat::Table));
    }

    #[test]
    fn test_record_row_marks_signatures() {
        let row = RecordRow::from(ListRow {
            id: RecordId::from("abc"),
            title: "t".into(),
            date: "2024-03-05".into(),
            parties: "Alice 和 Bob".into(),
            created: "2024/3/5".into(),
            party_a_signed: true,
            party_b_signed: false,
        });
        assert_eq!(row.signed, "A✓ B·");
        assert_eq!(row.id, "abc");
    }
}
