//! # Commands Module
//!
//! One handler per subcommand. Handlers return the text to print so they
//! can be exercised without a terminal.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs          ◄─── You are here (output helpers)
//! ├── transaction.rs  ◄─── add, update, delete, list
//! ├── vault.rs        ◄─── vault, verify, rebuild-vault
//! ├── report.rs       ◄─── report
//! ├── sync.rs         ◄─── sync test | init | pull | status
//! └── config.rs       ◄─── config show | init
//! ```
//!
//! ## Output
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  handler(store, args, json) ──► AppResult<String>                       │
//! │                                      │                                  │
//! │              json = false ──► aligned text table                        │
//! │              json = true  ──► serde_json::to_string_pretty(&value)      │
//! │                                      │                                  │
//! │  main() prints the string on stdout; logs go to stderr                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod report;
pub mod sync;
pub mod transaction;
pub mod vault;

use serde::Serialize;

use crate::error::AppResult;

/// Renders `value` as pretty JSON or through `text`.
pub(crate) fn render<T, F>(json: bool, value: &T, text: F) -> AppResult<String>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(text(value))
    }
}

/// Lays out rows in left-aligned columns separated by two spaces.
pub(crate) fn table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let width = widths.get(i).copied().unwrap_or(0);
                format!("{:<width$}", cell, width = width)
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 1);
    out.push(line(header.to_vec()));
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_alignment() {
        let out = table(
            &["ID", "AMOUNT"],
            &[
                vec!["a".into(), "₹10.00".into()],
                vec!["long-id".into(), "₹5.00".into()],
            ],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ID       AMOUNT");
        assert_eq!(lines[1], "a        ₹10.00");
        assert_eq!(lines[2], "long-id  ₹5.00");
    }

    #[test]
    fn test_render_json() {
        let out = render(true, &vec![1, 2], |_| String::new()).unwrap();
        assert!(out.contains('1'));
        let out = render(false, &vec![1, 2], |v| format!("{} items", v.len())).unwrap();
        assert_eq!(out, "2 items");
    }
}
