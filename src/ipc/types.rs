use serde::Deserialize;

use crate::expr::CalculatorState;
use crate::grades::{ConverterState, SubjectSheet};

pub const DEFAULT_ACCENT: &str = "#00b4d8";
pub const DEFAULT_BACKGROUND: &str = "particles";

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Session-only cosmetic configuration. The UI shell owns the canvas;
/// the daemon owns the decisions: which theme, which accent, which
/// animation style, and a handle the shell compares to know the
/// running animation loop was cancelled and must restart.
#[derive(Debug)]
pub struct AppearanceState {
    pub theme: Theme,
    pub accent: String,
    pub background: String,
    pub animation_handle: u64,
}

impl Default for AppearanceState {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            accent: DEFAULT_ACCENT.to_string(),
            background: DEFAULT_BACKGROUND.to_string(),
            animation_handle: 0,
        }
    }
}

impl AppearanceState {
    /// Cancel-and-restart: the old handle becomes stale, the new one
    /// identifies the replacement loop.
    pub fn restart_animation(&mut self) -> u64 {
        self.animation_handle += 1;
        self.animation_handle
    }
}

pub struct AppState {
    pub sheet: SubjectSheet,
    pub converter: ConverterState,
    pub calculator: CalculatorState,
    pub appearance: AppearanceState,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            sheet: SubjectSheet::new(),
            converter: ConverterState::default(),
            calculator: CalculatorState::default(),
            appearance: AppearanceState::default(),
        }
    }
}
