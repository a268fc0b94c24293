//! Timeline preview command.
//!
//! Replays scroll gestures against a fresh window so the navigation rules
//! can be inspected from the terminal.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use calmerge_core::{ScrollOutcome, TimelineWindow};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Serializable snapshot of a window.
#[derive(Debug, Serialize)]
pub struct TimelineView {
    pub anchors: Vec<NaiveDate>,
    pub current_index: usize,
    pub focused_date: NaiveDate,
    pub visible_days: Vec<NaiveDate>,
    pub month_label: String,
}

impl From<&TimelineWindow> for TimelineView {
    fn from(window: &TimelineWindow) -> Self {
        Self {
            anchors: window.anchors().collect(),
            current_index: window.current_index(),
            focused_date: window.focused_date(),
            visible_days: window.visible_days().to_vec(),
            month_label: window.month_label(),
        }
    }
}

pub fn run(
    config: &ClientConfig,
    date: Option<&str>,
    scrolls: &[usize],
    jump: Option<&str>,
    json: bool,
) -> ClientResult<()> {
    let today = Local::now().date_naive();
    let (window, notes) = build_window(config, date, today, scrolls, jump)?;

    for note in &notes {
        eprintln!("{}", note);
    }

    let view = TimelineView::from(&window);
    if json {
        let out = serde_json::to_string_pretty(&view)
            .map_err(|e| ClientError::Config(format!("failed to serialize timeline: {}", e)))?;
        println!("{}", out);
    } else {
        print!("{}", render(&view));
    }
    Ok(())
}

/// Builds the window and applies each scroll, then the jump.
///
/// Navigation failures do not abort; they are returned as notes alongside
/// the window.
pub fn build_window(
    config: &ClientConfig,
    date: Option<&str>,
    today: NaiveDate,
    scrolls: &[usize],
    jump: Option<&str>,
) -> ClientResult<(TimelineWindow, Vec<String>)> {
    let jump = jump
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|e| ClientError::Usage(format!("invalid --jump date {:?}: {}", raw, e)))
        })
        .transpose()?;

    let mut window =
        TimelineWindow::from_reference_or(date, today, config.timeline.week_start.weekday());
    if let Some(max) = config.timeline.max_anchors {
        window = window.with_max_anchors(max);
    }

    let mut notes = Vec::new();
    for &index in scrolls {
        match window.on_scroll_settled(index) {
            Ok(ScrollOutcome::Prepended { recenter_to }) => {
                notes.push(format!("scroll {}: prepended a week, recentered on {}", index, recenter_to));
            }
            Ok(ScrollOutcome::Appended) => {
                notes.push(format!("scroll {}: appended a week", index));
            }
            Ok(ScrollOutcome::Moved) => {}
            Err(e) => notes.push(format!("scroll {}: {}", index, e)),
        }
    }

    if let Some(date) = jump
        && let Err(e) = window.jump_to_date(date)
    {
        notes.push(format!("jump: {}", e));
    }

    Ok((window, notes))
}

fn render(view: &TimelineView) -> String {
    let mut out = format!("{}\n", view.month_label);
    for (i, anchor) in view.anchors.iter().enumerate() {
        let marker = if i == view.current_index { ">" } else { " " };
        out.push_str(&format!("{} {:>2}  week of {}\n", marker, i, anchor));
    }
    out.push('\n');
    for day in &view.visible_days {
        let marker = if *day == view.focused_date { "*" } else { " " };
        out.push_str(&format!("{} {}\n", marker, day.format("%a %d")));
    }
    out
}
