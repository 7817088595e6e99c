use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lift being attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LiftType {
    #[default]
    #[serde(rename = "SNATCH")]
    Snatch,
    #[serde(rename = "CLEANJERK")]
    CleanJerk,
}

impl LiftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiftType::Snatch => "SNATCH",
            LiftType::CleanJerk => "CLEANJERK",
        }
    }
}

impl fmt::Display for LiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LiftType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SNATCH" => Ok(LiftType::Snatch),
            "CLEANJERK" | "CLEAN_JERK" => Ok(LiftType::CleanJerk),
            other => Err(format!("unknown lift type: {}", other)),
        }
    }
}

/// The attempt currently on the platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptState {
    pub athlete: String,
    pub lift_type: LiftType,
    pub attempt_number: u32,

    /// Competition group; empty until the event source names one
    pub session_name: String,

    /// Clock start in epoch milliseconds (0 = no valid start captured)
    pub start_time_ms: i64,

    /// Decision time in epoch milliseconds (0 until a decision arrives)
    pub stop_time_ms: i64,
}

impl AttemptState {
    /// Human-readable "<athlete> - <LIFT> attempt <n>"
    pub fn describe(&self) -> String {
        format!(
            "{} - {} attempt {}",
            self.athlete.replace('_', " "),
            self.lift_type,
            self.attempt_number
        )
    }

    pub fn has_valid_start(&self) -> bool {
        self.start_time_ms != 0
    }
}
