//! Pick command - request candidates, scores or a winner

use crate::client::ProxyClient;
use crate::render;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::{Args, ValueEnum};
use console::style;
use qpick_common::view::{self, SortKey};
use qpick_common::{constants, Mode, PickRequest, PickResponse};

const INPUT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// What the backend should do with the candidates
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// List candidates without scoring
    OnlyList,
    /// Score candidates, no final pick
    ScoreOnly,
    /// Score candidates and pick a winner
    ScoreAndPick,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::OnlyList => Mode::OnlyList,
            ModeArg::ScoreOnly => Mode::ScoreOnly,
            ModeArg::ScoreAndPick => Mode::ScoreAndPick,
        }
    }
}

#[derive(Debug, Args)]
pub struct PickArgs {
    /// Window start, YYYY-MM-DD HH:MM (default: 6 hours before --end)
    #[arg(long)]
    pub start: Option<String>,

    /// Window end, YYYY-MM-DD HH:MM (default: now, local time)
    #[arg(long)]
    pub end: Option<String>,

    /// IANA time zone the window is expressed in
    #[arg(long, default_value = constants::DEFAULT_TZ)]
    pub tz: String,

    /// Maximum number of candidates the backend considers
    #[arg(
        long,
        default_value_t = constants::DEFAULT_CANDIDATE_LIMIT,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub limit: u32,

    /// Scoring criteria passed to the model
    #[arg(long)]
    pub criteria: Option<String>,

    /// Apply the backend's pre-filter
    #[arg(long)]
    pub prescoring: bool,

    /// Deduplicate near-identical candidates
    #[arg(long)]
    pub dedupe: bool,

    #[arg(short, long, value_enum, default_value_t = ModeArg::ScoreAndPick)]
    pub mode: ModeArg,

    /// Row order: as_is, score_desc, score_asc, time_asc, time_desc
    #[arg(long, default_value = "as_is")]
    pub sort: SortKey,

    /// Only show rows containing this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Print the raw model output
    #[arg(long)]
    pub raw: bool,

    /// Print the response body as returned and skip rendering
    #[arg(long)]
    pub json: bool,
}

pub async fn run(proxy: &str, args: PickArgs) -> Result<()> {
    let request = build_request(&args, Local::now().naive_local())?;
    let client = ProxyClient::new(proxy)?;

    eprintln!(
        "{} [{}] {} → {} ({})",
        style("qpick").cyan().bold(),
        request.mode(),
        request.start,
        request.end,
        request.tz
    );

    let body = client.pick_best_question(&request).await?;

    if args.json {
        println!("{}", body);
        return Ok(());
    }

    let response: PickResponse =
        serde_json::from_str(&body).context("Proxy returned a body that is not a pick response")?;

    print!("{}", render::summary_block(&response));

    let query = args.search.as_deref().unwrap_or("");
    let rows = view::visible_rows(&response, args.sort, query);
    println!();
    print!("{}", render::candidate_table(&rows));

    if rows.len() != response.candidates.len() {
        println!(
            "{}",
            style(format!("{} of {} rows match", rows.len(), response.candidates.len())).dim()
        );
    }

    if args.raw {
        if let Some(raw) = render::raw_block(&response) {
            println!();
            print!("{}", raw);
        }
    }

    Ok(())
}

/// Build the request a page submit would produce
fn build_request(args: &PickArgs, now: NaiveDateTime) -> Result<PickRequest> {
    let end = match &args.end {
        Some(s) => parse_bound(s)?,
        None => now,
    };

    let (default_start, end) = view::default_window(end);
    let start = match &args.start {
        Some(s) => view::format_window_bound(parse_bound(s)?),
        None => default_start,
    };

    let mut request = PickRequest::new(start, end, args.tz.clone()).with_mode(args.mode.into());
    request.candidate_limit = args.limit;
    request.use_prescoring = args.prescoring;
    request.dedupe = args.dedupe;
    request.scoring_criteria = args.criteria.clone();

    Ok(request)
}

/// Accepts `2024-01-01 10:00` and the `2024-01-01T10:00` input form
fn parse_bound(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&view::normalize_input_datetime(value.trim()), INPUT_FORMAT)
        .with_context(|| format!("Invalid time '{}', expected YYYY-MM-DD HH:MM", value))
}
