use serde::{Deserialize, Serialize};

/// Five-step ordinal scale shared by task importance and effort.
///
/// The labels and their numeric codes are part of the external contract and
/// must match what the presentation layer renders, so they are fixed here
/// rather than configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Level {
    VeryLow = 1,
    Low = 2,
    Medium = 3,
    High = 4,
    VeryHigh = 5,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::VeryLow,
        Level::Low,
        Level::Medium,
        Level::High,
        Level::VeryHigh,
    ];

    /// Numeric code, 1 (lowest) to 5 (highest).
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Level::VeryLow => "Çok Düşük",
            Level::Low => "Düşük",
            Level::Medium => "Orta",
            Level::High => "Yüksek",
            Level::VeryHigh => "Çok Yüksek",
        }
    }

    pub fn from_code(code: u8) -> Option<Level> {
        match code {
            1 => Some(Level::VeryLow),
            2 => Some(Level::Low),
            3 => Some(Level::Medium),
            4 => Some(Level::High),
            5 => Some(Level::VeryHigh),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Level> {
        Level::ALL.into_iter().find(|l| l.label() == label)
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Level::from_code(code).ok_or_else(|| format!("Invalid level code: {}", code))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.code()
    }
}

/// Which of the two level scales a color entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Importance,
    Effort,
}

impl Scale {
    pub fn as_str(self) -> &'static str {
        match self {
            Scale::Importance => "importance",
            Scale::Effort => "effort",
        }
    }

    pub fn from_str(s: &str) -> Option<Scale> {
        match s {
            "importance" => Some(Scale::Importance),
            "effort" => Some(Scale::Effort),
            _ => None,
        }
    }
}

const DEFAULT_IMPORTANCE_COLORS: [&str; 5] =
    ["#27ae60", "#2ecc71", "#f1c40f", "#e67e22", "#c0392b"];
const DEFAULT_EFFORT_COLORS: [&str; 5] =
    ["#444444", "#444444", "#444444", "#444444", "#444444"];

/// Display color per (scale, level) pair, customizable per level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelColors {
    importance: [String; 5],
    effort: [String; 5],
}

impl Default for LevelColors {
    fn default() -> Self {
        Self {
            importance: DEFAULT_IMPORTANCE_COLORS.map(String::from),
            effort: DEFAULT_EFFORT_COLORS.map(String::from),
        }
    }
}

impl LevelColors {
    pub fn color(&self, scale: Scale, level: Level) -> &str {
        let idx = (level.code() - 1) as usize;
        match scale {
            Scale::Importance => &self.importance[idx],
            Scale::Effort => &self.effort[idx],
        }
    }

    pub fn set(&mut self, scale: Scale, level: Level, color: impl Into<String>) {
        let idx = (level.code() - 1) as usize;
        match scale {
            Scale::Importance => self.importance[idx] = color.into(),
            Scale::Effort => self.effort[idx] = color.into(),
        }
    }
}
