use std::{fmt, str::FromStr};

/// Lifecycle stage of the managed tunnel, as reported by the tunnel manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TunnelState {
    Stopped,
    Starting,
    Started,
    Stopping,
    Unknown,
}

impl TunnelState {
    pub const ALL: [TunnelState; 5] = [
        Self::Stopped,
        Self::Starting,
        Self::Started,
        Self::Stopping,
        Self::Unknown,
    ];

    /// Whether the tunnel is somewhere between stopped and started
    pub fn is_transitional(self) -> bool {
        matches!(self, Self::Starting | Self::Stopping)
    }

    fn name(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Started => "started",
            Self::Stopping => "stopping",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TunnelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("'{0}' is not a tunnel state")]
pub struct ParseStateError(String);

impl FromStr for TunnelState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseStateError(s.to_owned()))
    }
}
