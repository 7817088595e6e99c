use serde::{Deserialize, Serialize};

use crate::state::LiftType;

/// Timing events from the scoring system, delivered in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TimingEvent {
    /// Clock started for an athlete's attempt
    AttemptStart {
        athlete: String,
        lift_type: LiftType,
        attempt_number: u32,
        start_time_ms: i64,
    },

    /// Referee decision given; ends the timed window
    DecisionGiven { stop_time_ms: i64 },

    /// A new competition group is on the platform
    SessionChanged { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_start_json() {
        let json = r#"{
            "type": "AttemptStart",
            "athlete": "Jane Doe",
            "lift_type": "SNATCH",
            "attempt_number": 1,
            "start_time_ms": 1000
        }"#;

        let event: TimingEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            TimingEvent::AttemptStart {
                athlete: "Jane Doe".to_string(),
                lift_type: LiftType::Snatch,
                attempt_number: 1,
                start_time_ms: 1000,
            }
        );
    }

    #[test]
    fn test_decision_json() {
        let event: TimingEvent =
            serde_json::from_str(r#"{"type":"DecisionGiven","stop_time_ms":9000}"#).unwrap();
        assert_eq!(event, TimingEvent::DecisionGiven { stop_time_ms: 9000 });
    }
}
