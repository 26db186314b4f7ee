//! Recency windows for chart filtering.

use chrono::{Duration, Months, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::normalize::DISPLAY_TZ;

/// How far back from "now" to include events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecencyWindow {
    #[serde(rename = "week")]
    Week,
    #[default]
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "year")]
    Year,
    #[serde(rename = "all")]
    All,
}

impl RecencyWindow {
    /// Wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecencyWindow::Week => "week",
            RecencyWindow::Month => "month",
            RecencyWindow::ThreeMonths => "3months",
            RecencyWindow::SixMonths => "6months",
            RecencyWindow::Year => "year",
            RecencyWindow::All => "all",
        }
    }

    /// Human label for UI surfaces.
    pub fn label(&self) -> &'static str {
        match self {
            RecencyWindow::Week => "Past Week",
            RecencyWindow::Month => "Past Month",
            RecencyWindow::ThreeMonths => "Past 3 Months",
            RecencyWindow::SixMonths => "Past 6 Months",
            RecencyWindow::Year => "Past Year",
            RecencyWindow::All => "All Time",
        }
    }

    /// All selectable windows, in UI order.
    pub fn all_windows() -> [RecencyWindow; 6] {
        [
            RecencyWindow::Week,
            RecencyWindow::Month,
            RecencyWindow::ThreeMonths,
            RecencyWindow::SixMonths,
            RecencyWindow::Year,
            RecencyWindow::All,
        ]
    }

    /// Cutoff wall-clock time for a given "now", in the display-zone
    /// civil calendar. `All` has no lower bound. Month-based windows
    /// use calendar arithmetic and clamp at short month ends
    /// (2024-03-31 minus one month is 2024-02-29).
    pub fn cutoff_at(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            RecencyWindow::Week => Some(now - Duration::days(7)),
            RecencyWindow::Month => now.checked_sub_months(Months::new(1)),
            RecencyWindow::ThreeMonths => now.checked_sub_months(Months::new(3)),
            RecencyWindow::SixMonths => now.checked_sub_months(Months::new(6)),
            RecencyWindow::Year => now.checked_sub_months(Months::new(12)),
            RecencyWindow::All => None,
        }
    }

    /// Cutoff relative to the current instant.
    pub fn cutoff(&self) -> Option<NaiveDateTime> {
        self.cutoff_at(now_local())
    }
}

/// Current wall-clock time in the display timezone.
pub fn now_local() -> NaiveDateTime {
    Utc::now().with_timezone(&DISPLAY_TZ).naive_local()
}

impl FromStr for RecencyWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(RecencyWindow::Week),
            "month" => Ok(RecencyWindow::Month),
            "3months" => Ok(RecencyWindow::ThreeMonths),
            "6months" => Ok(RecencyWindow::SixMonths),
            "year" => Ok(RecencyWindow::Year),
            "all" => Ok(RecencyWindow::All),
            other => Err(format!("unknown recency window: {other:?}")),
        }
    }
}

impl fmt::Display for RecencyWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn week_cutoff_is_seven_days() {
        let cutoff = RecencyWindow::Week.cutoff_at(at(2024, 6, 15)).unwrap();
        assert_eq!(cutoff, at(2024, 6, 8));
    }

    #[test]
    fn month_windows_use_calendar_arithmetic() {
        let now = at(2024, 6, 15);
        assert_eq!(RecencyWindow::Month.cutoff_at(now).unwrap(), at(2024, 5, 15));
        assert_eq!(
            RecencyWindow::ThreeMonths.cutoff_at(now).unwrap(),
            at(2024, 3, 15)
        );
        assert_eq!(
            RecencyWindow::SixMonths.cutoff_at(now).unwrap(),
            at(2023, 12, 15)
        );
        assert_eq!(RecencyWindow::Year.cutoff_at(now).unwrap(), at(2023, 6, 15));
    }

    #[test]
    fn short_month_end_clamps() {
        let cutoff = RecencyWindow::Month.cutoff_at(at(2024, 3, 31)).unwrap();
        assert_eq!(cutoff, at(2024, 2, 29));
    }

    #[test]
    fn all_has_no_cutoff() {
        assert_eq!(RecencyWindow::All.cutoff_at(at(2024, 6, 15)), None);
    }

    #[test]
    fn wire_names_round_trip() {
        for window in RecencyWindow::all_windows() {
            assert_eq!(window.as_str().parse::<RecencyWindow>().unwrap(), window);
            let json = serde_json::to_string(&window).unwrap();
            let back: RecencyWindow = serde_json::from_str(&json).unwrap();
            assert_eq!(back, window);
        }
    }

    #[test]
    fn default_is_month() {
        assert_eq!(RecencyWindow::default(), RecencyWindow::Month);
    }

    #[test]
    fn labels_match_ui_copy() {
        assert_eq!(RecencyWindow::Week.label(), "Past Week");
        assert_eq!(RecencyWindow::All.label(), "All Time");
    }
}
