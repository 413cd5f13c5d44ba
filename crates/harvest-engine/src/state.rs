//! Engine state.

use serde::Serialize;

/// Observable phase of the seller iteration engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum EngineState {
    /// Not started, or finished and ready for another run.
    Idle = 0,
    /// Opening the filter modal and seller panel.
    Opening = 1,
    /// Working on one seller.
    PerSellerActive = 2,
    /// Seller committed; preparing the next one.
    Advancing = 3,
    /// Every seller processed.
    Completed = 4,
    /// Stopped on request.
    Aborted = 5,
    /// Could not proceed at all.
    Fatal = 6,
}

impl EngineState {
    /// Whether a run in this state is still going.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            EngineState::Opening | EngineState::PerSellerActive | EngineState::Advancing
        )
    }
}

impl From<u8> for EngineState {
    fn from(v: u8) -> Self {
        match v {
            1 => EngineState::Opening,
            2 => EngineState::PerSellerActive,
            3 => EngineState::Advancing,
            4 => EngineState::Completed,
            5 => EngineState::Aborted,
            6 => EngineState::Fatal,
            _ => EngineState::Idle,
        }
    }
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineState::Idle => write!(f, "idle"),
            EngineState::Opening => write!(f, "opening"),
            EngineState::PerSellerActive => write!(f, "per_seller_active"),
            EngineState::Advancing => write!(f, "advancing"),
            EngineState::Completed => write!(f, "completed"),
            EngineState::Aborted => write!(f, "aborted"),
            EngineState::Fatal => write!(f, "fatal"),
        }
    }
}
