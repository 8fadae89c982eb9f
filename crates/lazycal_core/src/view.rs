//! Active calendar granularity.
//!
//! Pure in-memory state: nothing here is persisted, and switching views never
//! touches event data.

use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Calendar display granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    Month,
    Week,
    Day,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Month, ViewMode::Week, ViewMode::Day];

    /// View identifier understood by the calendar widget.
    pub fn widget_name(self) -> &'static str {
        match self {
            Self::Month => "dayGridMonth",
            Self::Week => "timeGridWeek",
            Self::Day => "timeGridDay",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
        }
    }
}

impl Display for ViewMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModeParseError(String);

impl Display for ViewModeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported view `{}`; expected month|week|day or a widget view name",
            self.0
        )
    }
}

impl Error for ViewModeParseError {}

impl FromStr for ViewMode {
    type Err = ViewModeParseError;

    /// Accepts `month|week|day` (any case) and the widget view names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|mode| {
                trimmed.eq_ignore_ascii_case(mode.label()) || trimmed == mode.widget_name()
            })
            .ok_or_else(|| ViewModeParseError(trimmed.to_string()))
    }
}

/// Holds the active `ViewMode` for one calendar instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewController {
    active: ViewMode,
}

impl ViewController {
    /// Starts in `ViewMode::Month`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_view(&mut self, mode: ViewMode) {
        debug!(
            "event=view_set module=view status=ok from={} to={}",
            self.active,
            mode
        );
        self.active = mode;
    }

    pub fn active_view(&self) -> ViewMode {
        self.active
    }

    /// Returns to the startup view.
    pub fn reset(&mut self) {
        self.set_view(ViewMode::default());
    }
}
