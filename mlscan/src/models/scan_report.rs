//! End-of-scan report
//!
//! Two ASCII tables (counts and timing) under a banner. They are placed
//! side by side when printing to a terminal wide enough for both, stacked
//! otherwise and always stacked in the log.

use super::scan_stats::ScanSummary;
use std::fmt::Write as _;
use tracing::info;

const TITLE: &str = "* Music Library Scan Completed *";
const TABLE_SPACING: usize = 4;
const DEFAULT_TERMINAL_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    SideBySide,
    Stacked,
}

pub struct ScanReport {
    summary: ScanSummary,
}

impl ScanReport {
    pub fn new(summary: ScanSummary) -> Self {
        Self { summary }
    }

    fn stats_table(&self) -> Vec<String> {
        let s = &self.summary;
        vec![
            "+-------------+---------------------+".to_string(),
            "| Statistics  | Count               |".to_string(),
            "+-------------+---------------------+".to_string(),
            format!("| Artists     | {:>19} |", s.artist_count),
            format!("| Albums      | {:>19} |", s.album_count),
            format!("| Tracks      | {:>19} |", s.track_count),
            "+-------------+---------------------+".to_string(),
        ]
    }

    fn metrics_table(&self) -> Vec<String> {
        let s = &self.summary;
        vec![
            "+-------------------+---------------------+".to_string(),
            "| Metric            | Value               |".to_string(),
            "+-------------------+---------------------+".to_string(),
            format!(
                "| Start Time        | {:>19} |",
                s.started_at.format("%Y-%m-%d %H:%M:%S").to_string()
            ),
            format!(
                "| End Time          | {:>19} |",
                s.finished_at.format("%Y-%m-%d %H:%M:%S").to_string()
            ),
            format!("| Duration          | {:>19} |", s.duration_display()),
            format!("| Tracks per second | {:>19.2} |", s.tracks_per_second()),
            format!("| Tracks per minute | {:>19.2} |", s.tracks_per_minute()),
            "+-------------------+---------------------+".to_string(),
        ]
    }

    /// Width needed to print both tables next to each other
    pub fn side_by_side_width(&self) -> usize {
        max_width(&self.stats_table()) + TABLE_SPACING + max_width(&self.metrics_table())
    }

    /// Side by side only on a visible console at least this wide (+2 margin)
    pub fn choose_layout(&self, quiet: bool, terminal_width: usize) -> Layout {
        if !quiet && terminal_width >= self.side_by_side_width() + 2 {
            Layout::SideBySide
        } else {
            Layout::Stacked
        }
    }

    pub fn render(&self, layout: Layout) -> String {
        let banner_width = TITLE.len() + 10;
        let banner = "=".repeat(banner_width);
        let padding = (banner_width - TITLE.len()) / 2;

        let mut out = String::new();
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", banner);
        let _ = writeln!(out, "{}{}", " ".repeat(padding), TITLE);
        let _ = writeln!(out, "{}", banner);
        let _ = writeln!(out);

        let stats = self.stats_table();
        let metrics = self.metrics_table();

        match layout {
            Layout::SideBySide => {
                let left_width = max_width(&stats);
                for i in 0..stats.len().max(metrics.len()) {
                    let left = stats.get(i).map(String::as_str).unwrap_or("");
                    let right = metrics.get(i).map(String::as_str).unwrap_or("");
                    let line = format!(
                        "{:<width$}{}{}",
                        left,
                        " ".repeat(TABLE_SPACING),
                        right,
                        width = left_width
                    );
                    let _ = writeln!(out, "{}", line.trim_end());
                }
            }
            Layout::Stacked => {
                for line in &stats {
                    let _ = writeln!(out, "{}", line);
                }
                let _ = writeln!(out);
                for line in &metrics {
                    let _ = writeln!(out, "{}", line);
                }
            }
        }

        out
    }

    /// Log the report and, unless quiet, print it to stdout
    pub fn emit(&self, quiet: bool) {
        info!("{}", self.render(Layout::Stacked));

        if !quiet {
            let layout = self.choose_layout(quiet, terminal_width());
            println!("{}", self.render(layout));
        }
    }
}

/// Terminal width from `COLUMNS`, 80 when unset or unparsable
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.trim().parse().ok())
        .filter(|w: &usize| *w > 0)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}

fn max_width(lines: &[String]) -> usize {
    lines.iter().map(|l| l.chars().count()).max().unwrap_or(0)
}
