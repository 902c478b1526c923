//! Terminal rendering of a pick response

use console::{style, StyledObject};
use qpick_common::view::{self, ScoreBand, Summary, WinnerPanel};
use qpick_common::{Candidate, PickResponse};

const QUESTION_CHARS: usize = 60;
const CELL_CHARS: usize = 40;
const ID_CHARS: usize = 14;

/// Summary line plus the winner panel when there is one
pub fn summary_block(response: &PickResponse) -> String {
    let mut out = format!("{}\n", style(Summary::from_response(response)).bold());

    if let Some(winner) = WinnerPanel::from_response(response) {
        out.push('\n');
        out.push_str(&format!(
            "{} {}\n",
            style("Winner:").dim(),
            style(&winner.msg_id).green().bold()
        ));
        out.push_str(&format!("  {}\n", style(&winner.content).bold()));
        out.push_str(&format!("  {} {}\n", style("Reason:").dim(), winner.reason));
    }

    out
}

/// Candidates table, one line per row
pub fn candidate_table(rows: &[&Candidate]) -> String {
    let mut out = format!(
        "{}\n",
        style(format!(
            "{:>4}  {:>6}  {:<14}  {:<14}  {:<20}  {:<60}  {:<40}  {}",
            "#", "score", "msg_id", "chat_id", "time (UTC)", "question", "answer", "reason"
        ))
        .dim()
    );

    for c in rows {
        let question = fit(
            &view::collapse_whitespace(c.content.as_deref().unwrap_or("")),
            QUESTION_CHARS,
        );
        let rank = c.rank.map(|r| r.to_string()).unwrap_or_default();
        out.push_str(&format!(
            "{:>4}  {}  {:<14}  {:<14}  {:<20}  {}  {}  {}\n",
            rank,
            score_style(c.model_score, format!("{:>6}", view::format_score(c.model_score))),
            fit(c.msg_id.as_deref().unwrap_or(""), ID_CHARS),
            fit(c.chat_id.as_deref().unwrap_or(""), ID_CHARS),
            c.created_at_iso.as_deref().unwrap_or(""),
            pad(&question, QUESTION_CHARS),
            pad(&cell_preview(c.answer.as_deref()), CELL_CHARS),
            cell_preview(c.model_reason.as_deref()),
        ));
    }

    out
}

/// Raw model output section
pub fn raw_block(response: &PickResponse) -> Option<String> {
    let raw = response.raw_model_output.as_deref().filter(|r| !r.is_empty())?;
    Some(format!("{}\n{}\n", style("Raw model output").dim(), raw))
}

fn cell_preview(text: Option<&str>) -> String {
    view::preview(text, CELL_CHARS - 1)
}

/// Middle-truncate to at most `max` characters including the ellipsis
fn fit(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        view::truncate_middle(s, max.saturating_sub(1))
    }
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}

fn score_style(score: Option<f64>, text: String) -> StyledObject<String> {
    match ScoreBand::of(score) {
        ScoreBand::Excellent | ScoreBand::Good => style(text).green(),
        ScoreBand::Fair => style(text).yellow(),
        ScoreBand::Weak => style(text).magenta(),
        ScoreBand::Poor => style(text).red(),
        ScoreBand::Unscored => style(text).dim(),
    }
}
