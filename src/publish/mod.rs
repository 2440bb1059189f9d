// src/publish/mod.rs

use async_trait::async_trait;
use thiserror::Error;

use crate::stats::DayStats;

pub mod oauth;
pub mod twitter;

pub use twitter::TwitterPublisher;

pub const BAR_SEGMENTS: usize = 15;
const FILLED: char = '▓';
const EMPTY: char = '░';

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// The external feed a message ends up on.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, text: &str) -> Result<(), PublishError>;
}

/// Render `percent` as a bar of `BAR_SEGMENTS` glyphs. Partially covered
/// segments stay empty; values outside 0..=100 clamp to an empty or full bar.
pub fn progress_bar(percent: f64) -> String {
    let per_segment = 100.0 / BAR_SEGMENTS as f64;
    // `as` saturates: negatives and NaN give 0
    let filled = ((percent / per_segment) as usize).min(BAR_SEGMENTS);

    let mut bar = String::with_capacity(BAR_SEGMENTS * FILLED.len_utf8());
    bar.extend(std::iter::repeat(FILLED).take(filled));
    bar.extend(std::iter::repeat(EMPTY).take(BAR_SEGMENTS - filled));
    bar
}

/// Delta with an explicit sign, rounded once at one decimal like the
/// coverage figure it sits next to.
fn signed(delta: f64) -> String {
    let text = format!("{delta:+.1}");
    // keep "-0.0" out of the feed
    if text == "-0.0" {
        "+0.0".to_string()
    } else {
        text
    }
}

/// The status text for one day.
pub fn format_message(stats: &DayStats) -> String {
    format!(
        "COVID-19 vaccinations in Germany as of {date}:\n\n\
         Partially vaccinated:\n{first_bar}\n{first:.1}% ({first_delta})\n\n\
         Fully vaccinated:\n{second_bar}\n{second:.1}% ({second_delta})",
        date = stats.date.format("%d.%m.%Y"),
        first_bar = progress_bar(stats.first_coverage),
        first = stats.first_coverage,
        first_delta = signed(stats.first_delta),
        second_bar = progress_bar(stats.second_coverage),
        second = stats.second_coverage,
        second_delta = signed(stats.second_delta),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn filled(bar: &str) -> usize {
        bar.chars().filter(|&c| c == FILLED).count()
    }

    #[test]
    fn bar_truncates_partial_segments() {
        let bar = progress_bar(33.3);
        assert_eq!(filled(&bar), 4);
        assert_eq!(bar.chars().count(), BAR_SEGMENTS);
        assert_eq!(bar, "▓▓▓▓░░░░░░░░░░░");
    }

    #[test]
    fn bar_bounds() {
        assert_eq!(filled(&progress_bar(0.0)), 0);
        assert_eq!(filled(&progress_bar(6.6)), 0);
        assert_eq!(filled(&progress_bar(50.0)), 7);
        assert_eq!(filled(&progress_bar(150.0)), BAR_SEGMENTS);
        assert_eq!(filled(&progress_bar(-3.0)), 0);
        assert_eq!(progress_bar(-3.0).chars().count(), BAR_SEGMENTS);
    }

    #[test]
    fn signed_delta() {
        assert_eq!(signed(2.0), "+2.0");
        assert_eq!(signed(0.26), "+0.3");
        assert_eq!(signed(-0.3), "-0.3");
        assert_eq!(signed(-0.04), "+0.0");
        assert_eq!(signed(-0.0), "+0.0");
    }

    #[test]
    fn signed_delta_rounds_the_exact_value_once() {
        assert_eq!(signed(0.25), "+0.2");
        assert_eq!(signed(0.24), "+0.2");
        assert_eq!(signed(-0.25), "-0.2");
    }

    #[test]
    fn formats_status_text() {
        let stats = DayStats {
            date: NaiveDate::from_ymd_opt(2021, 6, 2).unwrap(),
            first_coverage: 47.31,
            first_delta: 0.71,
            second_coverage: 25.5,
            second_delta: 1.04,
        };

        let expected = "COVID-19 vaccinations in Germany as of 02.06.2021:\n\n\
                        Partially vaccinated:\n▓▓▓▓▓▓▓░░░░░░░░\n47.3% (+0.7)\n\n\
                        Fully vaccinated:\n▓▓▓░░░░░░░░░░░░\n25.5% (+1.0)";
        assert_eq!(format_message(&stats), expected);
    }

    #[test]
    fn delta_and_coverage_round_alike() {
        // 40.00% -> 40.25%
        let stats = DayStats {
            date: NaiveDate::from_ymd_opt(2021, 6, 3).unwrap(),
            first_coverage: 40.25,
            first_delta: 0.25,
            second_coverage: 20.25,
            second_delta: 0.25,
        };

        let expected = "COVID-19 vaccinations in Germany as of 03.06.2021:\n\n\
                        Partially vaccinated:\n▓▓▓▓▓▓░░░░░░░░░\n40.2% (+0.2)\n\n\
                        Fully vaccinated:\n▓▓▓░░░░░░░░░░░░\n20.2% (+0.2)";
        assert_eq!(format_message(&stats), expected);
    }
}
