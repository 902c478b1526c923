//! qpick Common - Shared payload shapes and view rules
//!
//! This crate contains the request/response types exchanged with the
//! "pick best question" backend, the mode labels derived from them, and the
//! display rules (sorting, filtering, truncation) used by both the web page
//! and the terminal client.

pub mod view;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Request sent by a client to the proxy, and by the proxy to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickRequest {
    /// Window start, `YYYY-MM-DD HH:MM`, local to `tz`
    pub start: String,

    /// Window end, `YYYY-MM-DD HH:MM`, local to `tz`
    pub end: String,

    /// IANA zone name used to interpret `start` and `end`
    pub tz: String,

    /// Maximum number of candidates the backend should consider
    pub candidate_limit: u32,

    /// Apply the backend's cheap pre-filter
    pub use_prescoring: bool,

    /// Deduplicate near-identical candidates
    pub dedupe: bool,

    /// Free-text instructions for the scoring step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_criteria: Option<String>,

    /// Ask the backend to pick a single winner
    pub do_final_llm_selection: bool,

    /// Skip scoring entirely and only list candidates
    pub return_candidates_only: bool,
}

impl PickRequest {
    pub fn new(start: impl Into<String>, end: impl Into<String>, tz: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            tz: tz.into(),
            candidate_limit: constants::DEFAULT_CANDIDATE_LIMIT,
            use_prescoring: false,
            dedupe: false,
            scoring_criteria: None,
            do_final_llm_selection: false,
            return_candidates_only: false,
        }
    }

    /// Set both selection flags from a mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        let flags = mode.flags();
        self.return_candidates_only = flags.return_candidates_only;
        self.do_final_llm_selection = flags.do_final_llm_selection;
        self
    }

    /// Mode label for this request
    pub fn mode(&self) -> Mode {
        Mode::from_flags(SelectionFlags {
            return_candidates_only: self.return_candidates_only,
            do_final_llm_selection: self.do_final_llm_selection,
        })
    }
}

/// Response returned by the backend. Only read for display.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PickResponse {
    #[serde(default)]
    pub candidates_count: Option<u64>,

    #[serde(default)]
    pub candidates: Vec<Candidate>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub winner_msg_id: Option<String>,

    #[serde(default)]
    pub winner_content: Option<String>,

    /// Reasoning for the winner
    #[serde(default)]
    pub model_reason: Option<String>,

    /// Unparsed scoring-model text
    #[serde(default)]
    pub raw_model_output: Option<String>,
}

/// One candidate message as ranked by the backend
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub rank: Option<i64>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub msg_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub chat_id: Option<String>,

    #[serde(default)]
    pub created_at_iso: Option<String>,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub answer: Option<String>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub model_score: Option<f64>,

    #[serde(default)]
    pub model_reason: Option<String>,

    #[serde(default)]
    pub is_question: Option<bool>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub prescore: Option<f64>,
}

/// Ids come back as strings from most backends but some emit numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Non-numeric scores are treated as missing.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64().filter(|v| !v.is_nan()),
        _ => None,
    })
}

/// The two flags that decide what the backend does with a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionFlags {
    pub return_candidates_only: bool,
    pub do_final_llm_selection: bool,
}

impl SelectionFlags {
    /// Read the flags off an arbitrary JSON payload.
    ///
    /// Missing keys and non-object payloads read as `false`. Values are
    /// judged by truthiness, so `1` or `"yes"` count as set.
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            return_candidates_only: payload
                .get("return_candidates_only")
                .is_some_and(is_truthy),
            do_final_llm_selection: payload
                .get("do_final_llm_selection")
                .is_some_and(is_truthy),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Human-readable label for what a request asks the backend to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// List candidates, no scoring
    OnlyList,

    /// Score candidates, no final selection
    ScoreOnly,

    /// Score candidates and pick a winner
    ScoreAndPick,
}

impl Mode {
    pub fn from_flags(flags: SelectionFlags) -> Self {
        if flags.return_candidates_only {
            Mode::OnlyList
        } else if flags.do_final_llm_selection {
            Mode::ScoreAndPick
        } else {
            Mode::ScoreOnly
        }
    }

    /// Flag combination a client sends for this mode
    pub fn flags(&self) -> SelectionFlags {
        match self {
            Mode::OnlyList => SelectionFlags {
                return_candidates_only: true,
                do_final_llm_selection: false,
            },
            Mode::ScoreOnly => SelectionFlags::default(),
            Mode::ScoreAndPick => SelectionFlags {
                return_candidates_only: false,
                do_final_llm_selection: true,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::OnlyList => "onlyList",
            Mode::ScoreOnly => "scoreOnly",
            Mode::ScoreAndPick => "scoreAndPick",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constants shared by the proxy and its clients
pub mod constants {
    /// Proxy endpoint on the same origin as the page
    pub const API_PATH: &str = "/api/pick_best_question";

    /// Proxy health endpoint
    pub const HEALTH_PATH: &str = "/api/health";

    /// Backend endpoint, appended to the configured base URL
    pub const UPSTREAM_PATH: &str = "/pick_best_question";

    /// Service name reported by the health endpoint
    pub const SERVICE_NAME: &str = "qpick-server";

    pub const DEFAULT_TZ: &str = "Europe/Amsterdam";
    pub const DEFAULT_CANDIDATE_LIMIT: u32 = 200;

    /// Length of the default time window, ending now
    pub const DEFAULT_WINDOW_HOURS: i64 = 6;
}
