//! Week-anchored sliding window behind an infinite horizontal scroll.
//!
//! The window is an ascending run of week anchors, exactly seven days apart.
//! The host reports where a scroll gesture came to rest with
//! [`TimelineWindow::on_scroll_settled`]; reaching either edge grows the
//! window by one week on that side. Growth at the head shifts every logical
//! index by one, so the outcome tells the host which page to silently
//! re-center on.
//!
//! ```text
//!   scroll to 0            interior                scroll to len-1
//! [ +w0 | w1 | w2 | w3 ]   [ w1 | w2 | w3 ]   [ w1 | w2 | w3 | +w4 ]
//!          ^ index 1              ^ index           ^ index len-2
//! ```
//!
//! The window only shrinks when a maximum size is configured with
//! [`TimelineWindow::with_max_anchors`].

use std::collections::VecDeque;

use chrono::{Local, NaiveDate, Weekday};
use thiserror::Error;
use tracing::{debug, trace};

use crate::time::{next_week, previous_week, week_contains, week_start_of};

/// Number of anchors in a freshly built window.
pub const INITIAL_ANCHORS: usize = 3;

/// Non-fatal navigation failures. The window is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// The requested date's week is not part of the current window.
    #[error("{date} is outside the loaded timeline window")]
    NotInWindow { date: NaiveDate },

    /// The reported page does not exist.
    #[error("page {index} is out of range for a window of {len} weeks")]
    IndexOutOfRange { index: usize, len: usize },
}

/// What a settled scroll did to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// A week was added before the first anchor. The host must jump to
    /// `recenter_to` without animation so the viewport appears stationary.
    Prepended { recenter_to: usize },
    /// A week was added after the last anchor.
    Appended,
    /// The visible page changed inside the window.
    Moved,
}

/// The growable sequence of week anchors plus focus tracking.
#[derive(Debug, Clone)]
pub struct TimelineWindow {
    anchors: VecDeque<NaiveDate>,
    week_start: Weekday,
    focused_date: NaiveDate,
    current_index: usize,
    max_anchors: Option<usize>,
}

impl TimelineWindow {
    /// Builds `[previous week, reference week, next week]` with Sunday weeks.
    pub fn new(reference: NaiveDate) -> Self {
        Self::with_week_start(reference, Weekday::Sun)
    }

    /// Builds the initial window with a custom first day of week.
    pub fn with_week_start(reference: NaiveDate, week_start: Weekday) -> Self {
        let current = week_start_of(reference, week_start);
        let anchors = VecDeque::from([previous_week(current), current, next_week(current)]);

        Self {
            anchors,
            week_start,
            focused_date: reference,
            current_index: 1,
            max_anchors: None,
        }
    }

    /// Builds the window from a `YYYY-MM-DD` string, using today's local
    /// date when the input is missing or unparseable.
    pub fn from_reference(input: Option<&str>, week_start: Weekday) -> Self {
        Self::from_reference_or(input, Local::now().date_naive(), week_start)
    }

    /// Like [`Self::from_reference`] with an explicit fallback date.
    pub fn from_reference_or(input: Option<&str>, fallback: NaiveDate, week_start: Weekday) -> Self {
        let reference = match input.map(str::trim) {
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => date,
                Err(e) => {
                    debug!(input = raw, error = %e, "invalid reference date, using fallback");
                    fallback
                }
            },
            None => fallback,
        };
        Self::with_week_start(reference, week_start)
    }

    /// Caps the window size. Growth past `max` evicts the anchor at the
    /// opposite end. Values below the initial size are raised to it.
    pub fn with_max_anchors(mut self, max: usize) -> Self {
        self.max_anchors = Some(max.max(INITIAL_ANCHORS));
        self
    }

    /// Handles a scroll gesture that came to rest on page `new_index`.
    pub fn on_scroll_settled(&mut self, new_index: usize) -> Result<ScrollOutcome, NavigationError> {
        let len = self.anchors.len();
        if new_index >= len {
            return Err(NavigationError::IndexOutOfRange {
                index: new_index,
                len,
            });
        }

        if new_index == 0 {
            let head = previous_week(self.anchors[0]);
            self.anchors.push_front(head);
            self.current_index = 1;
            if self.over_capacity()
                && let Some(evicted) = self.anchors.pop_back()
            {
                trace!(%evicted, "evicted tail anchor");
            }
            debug!(anchor = %head, len = self.anchors.len(), "prepended week");
            return Ok(ScrollOutcome::Prepended { recenter_to: 1 });
        }

        if new_index == len - 1 {
            let tail = next_week(self.anchors[len - 1]);
            self.anchors.push_back(tail);
            self.current_index = new_index;
            if self.over_capacity()
                && let Some(evicted) = self.anchors.pop_front()
            {
                self.current_index -= 1;
                trace!(%evicted, "evicted head anchor");
            }
            debug!(anchor = %tail, len = self.anchors.len(), "appended week");
            return Ok(ScrollOutcome::Appended);
        }

        self.current_index = new_index;
        Ok(ScrollOutcome::Moved)
    }

    /// Centers the week containing `date` and focuses `date`.
    ///
    /// The window is never expanded to reach the date; a date outside the
    /// loaded weeks reports [`NavigationError::NotInWindow`] and changes
    /// nothing.
    pub fn jump_to_date(&mut self, date: NaiveDate) -> Result<usize, NavigationError> {
        let target = week_start_of(date, self.week_start);
        match self.anchors.iter().position(|anchor| *anchor == target) {
            Some(index) => {
                self.current_index = index;
                self.focused_date = date;
                Ok(index)
            }
            None => {
                debug!(%date, "jump target not in window");
                Err(NavigationError::NotInWindow { date })
            }
        }
    }

    /// Sets the focused day without moving the window.
    pub fn set_focused_day(&mut self, date: NaiveDate) {
        self.focused_date = date;
    }

    /// Index of the anchor whose week contains `date`, if loaded.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.anchors
            .iter()
            .position(|anchor| week_contains(*anchor, date))
    }

    pub fn anchors(&self) -> impl ExactSizeIterator<Item = NaiveDate> + '_ {
        self.anchors.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Always false; a window holds at least three weeks.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn focused_date(&self) -> NaiveDate {
        self.focused_date
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// The anchor of the page currently centered in the viewport.
    pub fn visible_anchor(&self) -> NaiveDate {
        self.anchors[self.current_index]
    }

    /// The seven days of the visible week.
    pub fn visible_days(&self) -> [NaiveDate; 7] {
        let anchor = self.visible_anchor();
        std::array::from_fn(|offset| anchor + chrono::Days::new(offset as u64))
    }

    /// Month label for the visible week, e.g. `June 2025`.
    pub fn month_label(&self) -> String {
        self.visible_anchor().format("%B %Y").to_string()
    }

    fn over_capacity(&self) -> bool {
        self.max_anchors
            .is_some_and(|max| self.anchors.len() > max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn anchors(window: &TimelineWindow) -> Vec<NaiveDate> {
        window.anchors().collect()
    }

    fn assert_weekly(window: &TimelineWindow) {
        let all = anchors(window);
        for pair in all.windows(2) {
            assert_eq!(pair[1] - pair[0], chrono::Duration::days(7));
        }
    }

    #[test]
    fn initial_window_thursday_reference() {
        let window = TimelineWindow::new(date(2025, 6, 19));

        assert_eq!(
            anchors(&window),
            vec![date(2025, 6, 8), date(2025, 6, 15), date(2025, 6, 22)]
        );
        assert_eq!(window.current_index(), 1);
        assert_eq!(window.focused_date(), date(2025, 6, 19));
        assert_eq!(window.visible_anchor(), date(2025, 6, 15));
    }

    #[test]
    fn scroll_to_first_page_prepends_and_recenters() {
        let mut window = TimelineWindow::new(date(2025, 6, 19));

        let outcome = window.on_scroll_settled(0).unwrap();

        assert_eq!(outcome, ScrollOutcome::Prepended { recenter_to: 1 });
        assert_eq!(
            anchors(&window),
            vec![
                date(2025, 6, 1),
                date(2025, 6, 8),
                date(2025, 6, 15),
                date(2025, 6, 22)
            ]
        );
        assert_eq!(window.current_index(), 1);
        assert_eq!(window.focused_date(), date(2025, 6, 19));
    }

    #[test]
    fn scroll_to_last_page_appends() {
        let mut window = TimelineWindow::new(date(2025, 6, 19));

        let outcome = window.on_scroll_settled(2).unwrap();

        assert_eq!(outcome, ScrollOutcome::Appended);
        assert_eq!(window.len(), 4);
        assert_eq!(window.current_index(), 2);
        assert_eq!(window.visible_anchor(), date(2025, 6, 22));
        assert_eq!(anchors(&window)[3], date(2025, 6, 29));
    }

    #[test]
    fn repeated_appends_grow_by_one() {
        let mut window = TimelineWindow::new(date(2025, 6, 19));
        let n = 10;

        for _ in 0..n {
            let last = window.len() - 1;
            window.on_scroll_settled(last).unwrap();
        }

        assert_eq!(window.len(), INITIAL_ANCHORS + n);
        assert_weekly(&window);
        assert_eq!(window.current_index(), window.len() - 2);
    }

    #[test]
    fn mixed_growth_stays_weekly() {
        let mut window = TimelineWindow::new(date(2025, 12, 30));
        for step in 0..8 {
            let index = if step % 2 == 0 { 0 } else { window.len() - 1 };
            window.on_scroll_settled(index).unwrap();
        }
        assert_eq!(window.len(), INITIAL_ANCHORS + 8);
        assert_weekly(&window);
    }

    #[test]
    fn interior_scroll_moves_index() {
        let mut window = TimelineWindow::new(date(2025, 6, 19));
        window.on_scroll_settled(2).unwrap();
        window.on_scroll_settled(3).unwrap();

        let outcome = window.on_scroll_settled(2).unwrap();

        assert_eq!(outcome, ScrollOutcome::Moved);
        assert_eq!(window.len(), 5);
        assert_eq!(window.current_index(), 2);
        assert_eq!(window.month_label(), "June 2025");
    }

    #[test]
    fn out_of_range_scroll_is_rejected() {
        let mut window = TimelineWindow::new(date(2025, 6, 19));
        let err = window.on_scroll_settled(3).unwrap_err();
        assert_eq!(err, NavigationError::IndexOutOfRange { index: 3, len: 3 });
        assert_eq!(window.len(), 3);
        assert_eq!(window.current_index(), 1);
    }

    #[test]
    fn jump_inside_window() {
        let mut window = TimelineWindow::new(date(2025, 6, 19));

        let index = window.jump_to_date(date(2025, 6, 24)).unwrap();

        assert_eq!(index, 2);
        assert_eq!(window.current_index(), 2);
        assert_eq!(window.focused_date(), date(2025, 6, 24));
    }

    #[test]
    fn jump_outside_window_is_not_found() {
        let mut window = TimelineWindow::new(date(2025, 6, 19));
        let before = anchors(&window);

        let target = date(2025, 7, 16); // three weeks past the last anchor
        let err = window.jump_to_date(target).unwrap_err();

        assert_eq!(err, NavigationError::NotInWindow { date: target });
        assert_eq!(anchors(&window), before);
        assert_eq!(window.current_index(), 1);
        assert_eq!(window.focused_date(), date(2025, 6, 19));
    }

    #[test]
    fn set_focused_day_does_not_move() {
        let mut window = TimelineWindow::new(date(2025, 6, 19));
        window.set_focused_day(date(2025, 9, 1));
        assert_eq!(window.focused_date(), date(2025, 9, 1));
        assert_eq!(window.current_index(), 1);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn reference_parsing_falls_back() {
        let fallback = date(2025, 6, 19);

        let window = TimelineWindow::from_reference_or(Some("2025-01-01"), fallback, Weekday::Sun);
        assert_eq!(window.focused_date(), date(2025, 1, 1));

        let window = TimelineWindow::from_reference_or(Some("not a date"), fallback, Weekday::Sun);
        assert_eq!(window.focused_date(), fallback);

        let window = TimelineWindow::from_reference_or(None, fallback, Weekday::Sun);
        assert_eq!(window.visible_anchor(), date(2025, 6, 15));
    }

    #[test]
    fn monday_weeks() {
        let window = TimelineWindow::with_week_start(date(2025, 6, 19), Weekday::Mon);
        assert_eq!(
            anchors(&window),
            vec![date(2025, 6, 9), date(2025, 6, 16), date(2025, 6, 23)]
        );
        assert_eq!(window.visible_days()[6], date(2025, 6, 22));
    }

    #[test]
    fn index_of_matches_week() {
        let window = TimelineWindow::new(date(2025, 6, 19));
        assert_eq!(window.index_of(date(2025, 6, 8)), Some(0));
        assert_eq!(window.index_of(date(2025, 6, 28)), Some(2));
        assert_eq!(window.index_of(date(2025, 6, 29)), None);
    }

    mod capped {
        use super::*;

        #[test]
        fn append_evicts_head_keeping_visible_week() {
            let mut window = TimelineWindow::new(date(2025, 6, 19)).with_max_anchors(3);

            window.on_scroll_settled(2).unwrap();

            assert_eq!(window.len(), 3);
            assert_eq!(
                anchors(&window),
                vec![date(2025, 6, 15), date(2025, 6, 22), date(2025, 6, 29)]
            );
            assert_eq!(window.current_index(), 1);
            assert_eq!(window.visible_anchor(), date(2025, 6, 22));
        }

        #[test]
        fn prepend_evicts_tail() {
            let mut window = TimelineWindow::new(date(2025, 6, 19)).with_max_anchors(4);
            window.on_scroll_settled(0).unwrap();
            assert_eq!(window.len(), 4);

            window.on_scroll_settled(0).unwrap();

            assert_eq!(window.len(), 4);
            assert_eq!(
                anchors(&window),
                vec![
                    date(2025, 5, 25),
                    date(2025, 6, 1),
                    date(2025, 6, 8),
                    date(2025, 6, 15)
                ]
            );
            assert_eq!(window.visible_anchor(), date(2025, 6, 1));
            assert_weekly(&window);
        }

        #[test]
        fn cap_below_initial_size_is_raised() {
            let mut window = TimelineWindow::new(date(2025, 6, 19)).with_max_anchors(1);
            window.on_scroll_settled(2).unwrap();
            assert_eq!(window.len(), INITIAL_ANCHORS);
        }
    }
}
