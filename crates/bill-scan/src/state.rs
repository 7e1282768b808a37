use std::fmt;

/// Where the current capture cycle stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CycleState {
    #[default]
    Idle,
    Capturing,
    Extracting,
    LedgerChecking,
    Notifying,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::Extracting => "extracting",
            Self::LedgerChecking => "ledger-checking",
            Self::Notifying => "notifying",
        };
        f.write_str(name)
    }
}
