//! Plain-text rendering of API responses for tool output.

use serde_json::Value;

const MAX_CELL_WIDTH: usize = 50;

/// Render records as a markdown-style table with the given columns.
///
/// Missing fields render as `N/A`, booleans as yes/no, and long cells are
/// truncated so a single wide field cannot blow up the output.
pub fn table(records: &[Value], columns: &[&str], title: &str, total: usize) -> String {
    if records.is_empty() {
        return "No results found.".to_string();
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let cell = cell_text(record.get(*column));
                    widths[i] = widths[i].max(cell.len());
                    cell
                })
                .collect()
        })
        .collect();

    let mut out = String::new();
    out.push_str(title);
    out.push_str("\n\n");

    let header: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
        .collect();
    out.push_str(&format!("| {} |\n", header.join(" | ")));

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("|-{}-|\n", rule.join("-|-")));

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    out.push_str(&format!("\nTotal: {total} record(s)"));
    out
}

/// Pretty-printed JSON inside a fenced code block (`raw` tool output).
pub fn json_block(value: &Value) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    format!("```json\n{pretty}\n```")
}

fn cell_text(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::Bool(true)) => "yes".to_string(),
        Some(Value::Bool(false)) => "no".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    if text.len() > MAX_CELL_WIDTH {
        let mut cut = MAX_CELL_WIDTH;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &text[..cut])
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_renders_columns_and_total() {
        let records = vec![
            json!({"id": 1, "name": "Widget", "weight": 2.5}),
            json!({"id": 2, "name": "Gadget"}),
        ];
        let out = table(&records, &["id", "name", "weight"], "Products", 2);

        assert!(out.starts_with("Products"));
        assert!(out.contains("| id | name   | weight |"));
        assert!(out.contains("| 1  | Widget | 2.5    |"));
        assert!(out.contains("| 2  | Gadget | N/A    |"));
        assert!(out.ends_with("Total: 2 record(s)"));
    }

    #[test]
    fn table_handles_empty_input() {
        assert_eq!(table(&[], &["id"], "Products", 0), "No results found.");
    }

    #[test]
    fn long_cells_are_truncated() {
        let records = vec![json!({"name": "x".repeat(80)})];
        let out = table(&records, &["name"], "T", 1);
        assert!(out.contains(&format!("{}...", "x".repeat(50))));
        assert!(!out.contains(&"x".repeat(51)));
    }

    #[test]
    fn json_block_is_fenced() {
        let out = json_block(&json!({"a": 1}));
        assert!(out.starts_with("```json\n"));
        assert!(out.ends_with("\n```"));
    }
}
