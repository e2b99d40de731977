//! Terminal output: per-image progress lines, notes and the summary table.

use bibtag_renamer::{BatchReport, ImageOutcome, SkipReason};

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

/// Errors go to stderr.
pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Per-image progress
// ---------------------------------------------------------------------------

/// Progress line for one image, without styling.
pub fn outcome_line(outcome: &ImageOutcome) -> String {
    match outcome {
        ImageOutcome::Renamed {
            source_name,
            new_name,
            overwrote,
        } => {
            let mut line = format!("created copy: {source_name} -> {new_name}");
            if *overwrote {
                line.push_str(" (replaced an existing file)");
            }
            line
        }
        ImageOutcome::Skipped {
            source_name,
            reason: SkipReason::NoNumbers,
        } => format!("no numbers found in {source_name}"),
        ImageOutcome::Skipped {
            source_name,
            reason: SkipReason::NoDetection,
        } => format!("no text detected in {source_name}"),
        ImageOutcome::Failed {
            source_name,
            reason,
        } => format!("error processing {source_name}: {reason}"),
    }
}

pub fn print_outcome(outcome: &ImageOutcome) {
    let line = outcome_line(outcome);
    match outcome {
        ImageOutcome::Renamed {
            overwrote: false, ..
        } => note_success(&line),
        ImageOutcome::Renamed { .. } => note_warn(&line),
        ImageOutcome::Skipped { .. } => note_info(&line),
        ImageOutcome::Failed { .. } => note_error(&line),
    }
}

pub fn batch_line(label: &str, report: &BatchReport) -> String {
    format!(
        "{label}: {} renamed, {} skipped, {} failed ({} images)",
        report.renamed(),
        report.skipped(),
        report.failed(),
        report.total()
    )
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

/// Column alignment.
pub enum Align {
    Left,
    Right,
}

/// A table column definition.
pub struct Column {
    pub header: String,
    pub align: Align,
}

impl Column {
    pub fn left(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            align: Align::Left,
        }
    }
    pub fn right(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            align: Align::Right,
        }
    }
}

/// Render a table with given columns and rows.
pub fn render_table(columns: &[Column], rows: &[Vec<String>], color: bool) -> String {
    let num_cols = columns.len();
    let mut widths: Vec<usize> = columns
        .iter()
        .map(|c| strip_ansi(&c.header).chars().count())
        .collect();
    for row in rows {
        for (i, cell) in row.iter().take(num_cols).enumerate() {
            widths[i] = widths[i].max(strip_ansi(cell).chars().count());
        }
    }

    let mut out = String::new();

    let header_cells: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| pad_cell(&col.header, widths[i], &col.align))
        .collect();
    let header = header_cells.join("  ");
    if color {
        out.push_str(&format!("{BOLD}  {header}  {RESET}\n"));
    } else {
        out.push_str(&format!("  {header}  \n"));
    }

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("  {}  \n", sep.join("  ")));

    for row in rows {
        let cells: Vec<String> = (0..num_cols)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                pad_cell(cell, widths[i], &columns[i].align)
            })
            .collect();
        out.push_str(&format!("  {}  \n", cells.join("  ")));
    }

    out
}

fn pad_cell(s: &str, width: usize, align: &Align) -> String {
    let pad = width.saturating_sub(strip_ansi(s).chars().count());
    match align {
        Align::Left => format!("{s}{}", " ".repeat(pad)),
        Align::Right => format!("{}{s}", " ".repeat(pad)),
    }
}

/// Per-backend counts and times for `compare`.
pub fn comparison_table(rows: &[(String, &BatchReport)]) -> String {
    let columns = [
        Column::left("Backend"),
        Column::right("Renamed"),
        Column::right("Skipped"),
        Column::right("Failed"),
        Column::right("Seconds"),
    ];
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|(label, report)| {
            vec![
                label.clone(),
                report.renamed().to_string(),
                report.skipped().to_string(),
                report.failed().to_string(),
                format!("{:.2}", report.elapsed.as_secs_f64()),
            ]
        })
        .collect();
    let color = supports_color();
    let table = render_table(&columns, &rows, color);
    if color {
        format!("{DIM}{table}{RESET}")
    } else {
        table
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn strips_ansi() {
        let colored = format!("{GREEN}hello{RESET}");
        assert_eq!(strip_ansi(&colored), "hello");
    }

    #[test]
    fn progress_lines() {
        let renamed = ImageOutcome::Renamed {
            source_name: "bib001.jpg".into(),
            new_name: "n7_n42.jpg".into(),
            overwrote: false,
        };
        assert_eq!(outcome_line(&renamed), "created copy: bib001.jpg -> n7_n42.jpg");

        let replaced = ImageOutcome::Renamed {
            source_name: "b.png".into(),
            new_name: "n5.png".into(),
            overwrote: true,
        };
        assert!(outcome_line(&replaced).ends_with("(replaced an existing file)"));

        let skipped = ImageOutcome::Skipped {
            source_name: "crowd.png".into(),
            reason: SkipReason::NoNumbers,
        };
        assert_eq!(outcome_line(&skipped), "no numbers found in crowd.png");

        let failed = ImageOutcome::Failed {
            source_name: "a.jpg".into(),
            reason: "Ollama returned 500".into(),
        };
        assert_eq!(outcome_line(&failed), "error processing a.jpg: Ollama returned 500");
    }

    #[test]
    fn renders_aligned_table() {
        let cols = vec![Column::left("Backend"), Column::right("Seconds")];
        let rows = vec![
            vec!["CPU".to_string(), "12.50".to_string()],
            vec!["Ollama".to_string(), "3.10".to_string()],
        ];
        let table = render_table(&cols, &rows, false);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "  Backend  Seconds  ");
        assert_eq!(lines[2], "  CPU        12.50  ");
        assert_eq!(lines[3], "  Ollama      3.10  ");
    }

    #[test]
    fn batch_line_counts() {
        let report = BatchReport {
            backend: "ocr".into(),
            outcomes: vec![ImageOutcome::Skipped {
                source_name: "a.jpg".into(),
                reason: SkipReason::NoDetection,
            }],
            elapsed: Duration::from_secs(1),
        };
        assert_eq!(
            batch_line("CPU", &report),
            "CPU: 0 renamed, 1 skipped, 0 failed (1 images)"
        );
    }
}
