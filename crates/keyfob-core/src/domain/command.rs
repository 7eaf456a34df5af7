//! Command dispatch result types.
//!
//! Every trigger path — the physical button and the remote command surface —
//! produces a [`CommandResult`]. Outcomes are plain values, never panics or
//! exceptions crossing component boundaries; the transport adapter decides
//! how each outcome renders (HTTP status codes, log lines).

/// Where a dispatch request originated. Authorization applies only to the
/// remote path; physical possession of the button is its own authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Physical,
    Remote,
}

/// Outcome taxonomy for a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The macro ran to completion.
    Ok,
    /// The HID emitter (or the link it rides on) is unavailable.
    NotConnected,
    /// Credential missing or mismatched on a gated remote command.
    Unauthorized,
    /// A required parameter was missing or empty.
    BadRequest,
    /// No macro is registered under the requested name.
    NotFound,
}

/// Result of one dispatch; ephemeral, produced per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub outcome: CommandOutcome,
    pub message: String,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            outcome: CommandOutcome::Ok,
            message: message.into(),
        }
    }

    pub fn not_connected() -> Self {
        Self {
            outcome: CommandOutcome::NotConnected,
            message: "HID target not connected".to_string(),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            outcome: CommandOutcome::Unauthorized,
            message: "invalid or missing credential".to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            outcome: CommandOutcome::BadRequest,
            message: message.into(),
        }
    }

    pub fn not_found(name: &str) -> Self {
        Self {
            outcome: CommandOutcome::NotFound,
            message: format!("unknown command: {name}"),
        }
    }
}
