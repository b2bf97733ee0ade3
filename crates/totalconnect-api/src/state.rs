// Vendor state and result code taxonomy
//
// Pure mappings between the panel service's numeric codes and the small
// generalized vocabulary the rest of the workspace speaks. The vendor set
// is large (per-panel-family quirks, bypass/instant variants, transitional
// codes); everything funnels into six generalized states. No I/O here.

use tracing::warn;

use crate::auth::ProtocolGeneration;

// ── Vendor arming-state codes ────────────────────────────────────────
//
// Observed across panel families (Lynx Touch, ProA7, VISTA). Transitional
// codes (arming/disarming) report as disarmed until the panel settles.

const DISARMED: i32 = 10200;
const ARMED_AWAY: i32 = 10201;
const ARMED_AWAY_BYPASS: i32 = 10202;
const ARMED_STAY: i32 = 10203;
const ARMED_STAY_BYPASS: i32 = 10204;
const ARMED_AWAY_INSTANT: i32 = 10205;
const ARMED_AWAY_INSTANT_BYPASS: i32 = 10206;
/// Perimeter sensors (doors/windows), plus the panel's Medical and Police buttons.
const ALARMING_PERIMETER: i32 = 10207;
const ARMED_NIGHT: i32 = 10209;
const ARMED_NIGHT_BYPASS: i32 = 10210;
const DISARMED_BYPASS: i32 = 10211;
/// Smoke detectors, plus the panel's Fire button.
const ALARMING_FIRE_SMOKE: i32 = 10212;
const ALARMING_CARBON_MONOXIDE: i32 = 10213;
/// Zone(s) faulted.
const DISARMED_NOT_READY: i32 = 10214;
const ARMED_STAY_NIGHT: i32 = 10218;
// 10219-10221 reported by the ProA7 panel.
const ARMED_STAY_NIGHT_BYPASS: i32 = 10219;
const ARMED_STAY_NIGHT_INSTANT: i32 = 10220;
const ARMED_STAY_NIGHT_INSTANT_BYPASS: i32 = 10221;
const ARMED_CUSTOM_BYPASS: i32 = 10223;
/// Lynx Touch 7000 started reporting this instead of 10203 in late 2021.
const ARMED_STAY_LYNX_TOUCH: i32 = 10226;
// 10230-10233 reported by the ProA7 panel.
const ARMED_STAY_PRO_A7: i32 = 10230;
const ARMED_STAY_BYPASS_PRO_A7: i32 = 10231;
const ARMED_STAY_INSTANT_PRO_A7: i32 = 10232;
const ARMED_STAY_INSTANT_BYPASS_PRO_A7: i32 = 10233;
const ARMING: i32 = 10307;
const DISARMING: i32 = 10308;

// ── ArmingState ──────────────────────────────────────────────────────

/// Generalized arming posture of a panel or partition.
///
/// Collapses the vendor's per-family code zoo into the six states a
/// consumer can act on. [`Unknown`](Self::Unknown) doubles as the
/// "status unavailable" value for failure-tolerant status queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmingState {
    Unknown,
    Disarmed,
    ArmedAway,
    ArmedStay,
    ArmedNight,
    AlarmTriggered,
}

impl ArmingState {
    /// Map a vendor arming-state code to its generalized state.
    ///
    /// Total over all inputs: a code outside the known set degrades to
    /// [`Unknown`](Self::Unknown) with a diagnostic, never an error.
    pub fn from_vendor(code: i32) -> Self {
        match code {
            DISARMED | DISARMED_BYPASS | DISARMED_NOT_READY | ARMING | DISARMING => Self::Disarmed,
            ARMED_AWAY | ARMED_AWAY_BYPASS | ARMED_AWAY_INSTANT | ARMED_AWAY_INSTANT_BYPASS => {
                Self::ArmedAway
            }
            ARMED_STAY
            | ARMED_STAY_BYPASS
            | ARMED_CUSTOM_BYPASS
            | ARMED_STAY_LYNX_TOUCH
            | ARMED_STAY_PRO_A7
            | ARMED_STAY_BYPASS_PRO_A7 => Self::ArmedStay,
            ARMED_NIGHT
            | ARMED_NIGHT_BYPASS
            | ARMED_STAY_NIGHT
            | ARMED_STAY_NIGHT_BYPASS
            | ARMED_STAY_NIGHT_INSTANT
            | ARMED_STAY_NIGHT_INSTANT_BYPASS
            | ARMED_STAY_INSTANT_PRO_A7
            | ARMED_STAY_INSTANT_BYPASS_PRO_A7 => Self::ArmedNight,
            ALARMING_PERIMETER | ALARMING_FIRE_SMOKE | ALARMING_CARBON_MONOXIDE => {
                Self::AlarmTriggered
            }
            other => {
                warn!(code = other, "unrecognized arming-state code");
                Self::Unknown
            }
        }
    }
}

// ── ArmTarget ────────────────────────────────────────────────────────

/// The four actionable arming targets a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmTarget {
    Disarm,
    Stay,
    Night,
    Away,
}

impl ArmTarget {
    /// The vendor arm-type code for this target.
    ///
    /// The two protocol generations use incompatible encodings, so the
    /// codec is parameterized rather than global.
    pub fn vendor_code(self, generation: ProtocolGeneration) -> i32 {
        match generation {
            ProtocolGeneration::Rest => match self {
                Self::Away => 0,
                Self::Stay => 1,
                Self::Night => 2,
                Self::Disarm => -1,
            },
            ProtocolGeneration::Legacy => match self {
                Self::Disarm => 0,
                Self::Stay => 1,
                Self::Night => 2,
                Self::Away => 3,
            },
        }
    }

    /// The generalized state this target settles into once the panel
    /// completes the command.
    pub fn settled_state(self) -> ArmingState {
        match self {
            Self::Disarm => ArmingState::Disarmed,
            Self::Stay => ArmingState::ArmedStay,
            Self::Night => ArmingState::ArmedNight,
            Self::Away => ArmingState::ArmedAway,
        }
    }
}

// ── ResultCode ───────────────────────────────────────────────────────

/// Classified per-call result code, distinct from arming state.
///
/// `Initiated` and `PollAgain` mean the command is still in flight;
/// `Success` is terminal success; everything else is terminal failure.
/// `SessionExpired` is a transport-level signal consumed by the clients'
/// re-authentication retry and never reaches callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Success,
    Initiated,
    PollAgain,
    SessionExpired,
    Timeout,
    InvalidUserCode,
    CommunicationFailure,
    InvalidLocation,
    ConnectionError,
    Other(i32),
}

/// Vendor code for an expired session, recognized by the legacy transport.
pub(crate) const RESULT_SESSION_EXPIRED: i32 = -102;

impl ResultCode {
    /// Classify a raw vendor result code. Total: unknown codes become
    /// [`Other`](Self::Other).
    ///
    /// The legacy generation reports timeout and communication failures
    /// as positive codes where the REST generation uses negative ones;
    /// both spellings classify identically.
    pub fn classify(code: i32) -> Self {
        match code {
            0 => Self::Success,
            4500 => Self::Initiated,
            4501 => Self::PollAgain,
            RESULT_SESSION_EXPIRED => Self::SessionExpired,
            4101 | -4101 => Self::Timeout,
            -4106 => Self::InvalidUserCode,
            4108 | -4108 => Self::CommunicationFailure,
            -4002 => Self::InvalidLocation,
            -4008 => Self::ConnectionError,
            other => Self::Other(other),
        }
    }

    /// True while the command is still executing on the panel side.
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Initiated | Self::PollAgain)
    }

    /// True once the code ends a command (successfully or not).
    pub fn is_terminal(self) -> bool {
        !self.is_pending()
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Initiated => write!(f, "command initiated"),
            Self::PollAgain => write!(f, "command in progress"),
            Self::SessionExpired => write!(f, "session expired"),
            Self::Timeout => write!(f, "timed out connecting to the system"),
            Self::InvalidUserCode => write!(f, "the user code was rejected"),
            Self::CommunicationFailure => write!(f, "error communicating with the system"),
            Self::InvalidLocation => write!(f, "invalid location supplied"),
            Self::ConnectionError => write!(f, "a connection error occurred"),
            Self::Other(code) => write!(f, "unrecognized result code {code}"),
        }
    }
}
