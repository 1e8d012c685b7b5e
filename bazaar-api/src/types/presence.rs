//! Presence API types

use bazaar_core::Timestamp;
use serde::{Deserialize, Serialize};

/// What made the client send a heartbeat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum BeatReason {
    /// The presence loop started
    Mount,
    /// Periodic tick
    #[default]
    Interval,
    /// The tab became visible again
    Visible,
}

impl BeatReason {
    /// Visibility beats are written even inside the coalescing window.
    pub fn bypasses_coalescing(self) -> bool {
        matches!(self, BeatReason::Visible)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BeatReason::Mount => "mount",
            BeatReason::Interval => "interval",
            BeatReason::Visible => "visible",
        }
    }
}

/// Query parameters of the heartbeat endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct HeartbeatParams {
    pub reason: Option<BeatReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HeartbeatResponse {
    /// False when the heartbeat was coalesced with a recent one
    pub written: bool,
    /// `last_seen` as of the most recent accepted write
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub last_seen: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_visible_bypasses_coalescing() {
        assert!(BeatReason::Visible.bypasses_coalescing());
        assert!(!BeatReason::Mount.bypasses_coalescing());
        assert!(!BeatReason::Interval.bypasses_coalescing());
        assert_eq!(HeartbeatParams::default().reason.unwrap_or_default(), BeatReason::Interval);
    }

    #[test]
    fn test_reason_wire_names_match_as_str() {
        for reason in [BeatReason::Mount, BeatReason::Interval, BeatReason::Visible] {
            let wire = serde_json::to_value(reason).unwrap();
            assert_eq!(wire, reason.as_str());
        }
    }
}
