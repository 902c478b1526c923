//! Display rules for a pick response
//!
//! The web page and the terminal client render a response the same way:
//! rows are re-derived from the last response on every sort or search change,
//! long text is truncated in the middle, and the summary only mentions a
//! winner when the backend produced one.

use crate::{constants, Candidate, PickResponse};
use chrono::{Duration, NaiveDateTime};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Placeholder shown for missing text
pub const PLACEHOLDER: &str = "—";

const WINDOW_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("unknown sort key: {0}")]
    UnknownSortKey(String),
}

/// Row ordering for the candidates table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Backend order
    #[default]
    AsIs,
    ScoreDesc,
    ScoreAsc,
    TimeAsc,
    TimeDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::AsIs,
        SortKey::ScoreDesc,
        SortKey::ScoreAsc,
        SortKey::TimeAsc,
        SortKey::TimeDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::AsIs => "as_is",
            SortKey::ScoreDesc => "score_desc",
            SortKey::ScoreAsc => "score_asc",
            SortKey::TimeAsc => "time_asc",
            SortKey::TimeDesc => "time_desc",
        }
    }
}

impl FromStr for SortKey {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ViewError::UnknownSortKey(s.to_string()))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort candidates without touching the backend order of the input.
///
/// Candidates without a score go last for both score orders. Time orders
/// compare the ISO timestamp strings.
pub fn sort_candidates(candidates: &[Candidate], key: SortKey) -> Vec<&Candidate> {
    let mut rows: Vec<&Candidate> = candidates.iter().collect();

    match key {
        SortKey::AsIs => {}
        SortKey::ScoreDesc => {
            rows.sort_by(|a, b| compare_scores(a.model_score, b.model_score, true))
        }
        SortKey::ScoreAsc => {
            rows.sort_by(|a, b| compare_scores(a.model_score, b.model_score, false))
        }
        SortKey::TimeAsc => rows.sort_by(|a, b| timestamp(a).cmp(timestamp(b))),
        SortKey::TimeDesc => rows.sort_by(|a, b| timestamp(b).cmp(timestamp(a))),
    }

    rows
}

fn compare_scores(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn timestamp(candidate: &Candidate) -> &str {
    candidate.created_at_iso.as_deref().unwrap_or("")
}

/// Case-insensitive substring match over ids, question, answer and reasoning
pub fn matches_query(candidate: &Candidate, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    let haystack = format!(
        "{} {} {} {} {}",
        candidate.msg_id.as_deref().unwrap_or(""),
        candidate.chat_id.as_deref().unwrap_or(""),
        candidate.content.as_deref().unwrap_or(""),
        candidate.answer.as_deref().unwrap_or(""),
        candidate.model_reason.as_deref().unwrap_or(""),
    )
    .to_lowercase();

    haystack.contains(&query.to_lowercase())
}

/// Rows to show for a response, sorted then filtered
pub fn visible_rows<'a>(
    response: &'a PickResponse,
    key: SortKey,
    query: &str,
) -> Vec<&'a Candidate> {
    sort_candidates(&response.candidates, key)
        .into_iter()
        .filter(|c| matches_query(c, query))
        .collect()
}

/// Collapse every run of whitespace into a single space and trim the ends
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shorten `s` to roughly `max` characters, keeping both ends.
///
/// Keeps the first 65% and the last 25% of the budget, joined by `…`.
/// Strings within budget are returned unchanged.
pub fn truncate_middle(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }

    let head = max * 65 / 100;
    let tail = max * 25 / 100;

    let prefix: String = s.chars().take(head).collect();
    let suffix: String = s.chars().skip(len - tail).collect();
    format!("{}…{}", prefix, suffix)
}

/// Single-line preview of a long text cell, placeholder when blank
pub fn preview(text: Option<&str>, max: usize) -> String {
    let collapsed = collapse_whitespace(text.unwrap_or(""));
    if collapsed.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        truncate_middle(&collapsed, max)
    }
}

/// Colour band of a model score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Weak,
    Poor,
    Unscored,
}

impl ScoreBand {
    pub fn of(score: Option<f64>) -> Self {
        match score {
            None => ScoreBand::Unscored,
            Some(v) if v.is_nan() => ScoreBand::Unscored,
            Some(v) if v >= 80.0 => ScoreBand::Excellent,
            Some(v) if v >= 60.0 => ScoreBand::Good,
            Some(v) if v >= 40.0 => ScoreBand::Fair,
            Some(v) if v >= 20.0 => ScoreBand::Weak,
            Some(_) => ScoreBand::Poor,
        }
    }
}

/// Score as shown in a table cell
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(v) if !v.is_nan() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Totals line shown above the table
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: u64,
    pub scored: usize,
    /// Mean score rounded to one decimal
    pub average: Option<f64>,
    pub winner_msg_id: Option<String>,
}

impl Summary {
    pub fn from_response(response: &PickResponse) -> Self {
        let scores: Vec<f64> = response
            .candidates
            .iter()
            .filter_map(|c| c.model_score)
            .collect();

        let average = if scores.is_empty() {
            None
        } else {
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            Some((mean * 10.0).round() / 10.0)
        };

        Self {
            total: response.candidates_count.unwrap_or(0),
            scored: scores.len(),
            average,
            winner_msg_id: response.winner_msg_id.clone().filter(|id| !id.is_empty()),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Candidates: {} · Scored: {}", self.total, self.scored)?;
        if let Some(avg) = self.average {
            write!(f, " (avg: {})", avg)?;
        }
        if let Some(id) = &self.winner_msg_id {
            write!(f, " · Winner: {}", id)?;
        }
        Ok(())
    }
}

/// Winner details, present only when the backend picked one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerPanel {
    pub msg_id: String,
    pub content: String,
    pub reason: String,
}

impl WinnerPanel {
    pub fn from_response(response: &PickResponse) -> Option<Self> {
        let msg_id = response.winner_msg_id.clone().filter(|id| !id.is_empty())?;

        Some(Self {
            msg_id,
            content: response.winner_content.clone().unwrap_or_default(),
            reason: response
                .model_reason
                .clone()
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        })
    }
}

/// Default window ending at `now`, formatted as the backend expects
pub fn default_window(now: NaiveDateTime) -> (String, String) {
    let start = now - Duration::hours(constants::DEFAULT_WINDOW_HOURS);
    (format_window_bound(start), format_window_bound(now))
}

pub fn format_window_bound(dt: NaiveDateTime) -> String {
    dt.format(WINDOW_FORMAT).to_string()
}

/// Turn a `datetime-local` input value (`2024-01-01T10:00`) into a window bound
pub fn normalize_input_datetime(value: &str) -> String {
    value.replacen('T', " ", 1)
}
