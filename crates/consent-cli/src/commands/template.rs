//! Built-in template listing

use crate::error::CliResult;
use crate::output::{print_output, OutputFormat};
use consent_types::templates;
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Serialize, Tabled)]
pub struct TemplateRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "名称")]
    pub name: String,
    #[tabled(rename = "说明")]
    pub description: String,
    #[tabled(rename = "安全措施")]
    pub safety_measures: String,
}

pub fn rows() -> Vec<TemplateRow> {
    templates()
        .iter()
        .map(|t| TemplateRow {
            id: t.id.to_string(),
            name: t.name.to_string(),
            description: t.description.to_string(),
            safety_measures: t
                .safety_measures
                .iter()
                .map(|m| m.label())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect()
}

pub fn list(format: OutputFormat) -> CliResult<()> {
    print_output(rows(), format, "No templates")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_cover_builtin_templates() {
        let ids: Vec<String> = rows().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["basic", "detailed", "long-term"]);
    }
}
