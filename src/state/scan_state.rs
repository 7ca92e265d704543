/// Bucket scan state definitions
///
/// A bucket scan moves `AwaitingFirstResult -> Scrolling -> Stopped`, or
/// straight from `AwaitingFirstResult` to `Stopped` when nothing renders.
use std::fmt;

/// Why a bucket scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// No result rendered before the first-result timeout
    NoResults,

    /// The configured number of consecutive rounds found no new id
    Exhausted,

    /// The hard step cap was reached first (forced stop, not an error)
    StepCap,

    /// The search page could not be loaded
    NavigationFailed,
}

impl StopReason {
    /// Returns true if the scan ran to its natural end
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::NoResults | Self::Exhausted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoResults => "no_results",
            Self::Exhausted => "exhausted",
            Self::StepCap => "step_cap",
            Self::NavigationFailed => "navigation_failed",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current state of a bucket scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Page loaded, waiting for the first result node
    AwaitingFirstResult,

    /// Reading rendered nodes and advancing the viewport
    Scrolling,

    /// Terminal
    Stopped(StopReason),
}

impl ScanState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }

    /// Applies the result of one scroll round
    ///
    /// `idle_rounds` is the number of consecutive rounds without a new id,
    /// `step` the zero-based index of the round just finished.
    pub fn after_round(
        self,
        idle_rounds: u32,
        idle_threshold: u32,
        step: u32,
        max_steps: u32,
    ) -> Self {
        match self {
            Self::Scrolling if idle_rounds >= idle_threshold => {
                Self::Stopped(StopReason::Exhausted)
            }
            Self::Scrolling if step + 1 >= max_steps => Self::Stopped(StopReason::StepCap),
            other => other,
        }
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingFirstResult => write!(f, "awaiting_first_result"),
            Self::Scrolling => write!(f, "scrolling"),
            Self::Stopped(reason) => write!(f, "stopped({})", reason),
        }
    }
}
