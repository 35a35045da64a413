//! Versioned command/response/event envelopes exchanged with the
//! presentation shell.

use serde::{Deserialize, Serialize};

/// Contract version for host command/event envelopes.
pub const EVENT_VERSION: u32 = 1;

/// Commands accepted from the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandName {
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "version")]
    Version,
    #[serde(rename = "get-quote")]
    GetQuote,
    #[serde(rename = "get-prayer")]
    GetPrayer,
    #[serde(rename = "get-config")]
    GetConfig,
    #[serde(rename = "save-settings")]
    SaveSettings,
    /// Show a quote popup immediately.
    #[serde(rename = "show-now")]
    ShowNow,
    #[serde(rename = "power-resume")]
    PowerResume,
    #[serde(rename = "power-unlock")]
    PowerUnlock,
    #[serde(rename = "stop")]
    Stop,
}

impl CommandName {
    pub const ALL: [Self; 10] = [
        Self::Ping,
        Self::Version,
        Self::GetQuote,
        Self::GetPrayer,
        Self::GetConfig,
        Self::SaveSettings,
        Self::ShowNow,
        Self::PowerResume,
        Self::PowerUnlock,
        Self::Stop,
    ];

    /// Render command name to wire format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Version => "version",
            Self::GetQuote => "get-quote",
            Self::GetPrayer => "get-prayer",
            Self::GetConfig => "get-config",
            Self::SaveSettings => "save-settings",
            Self::ShowNow => "show-now",
            Self::PowerResume => "power-resume",
            Self::PowerUnlock => "power-unlock",
            Self::Stop => "stop",
        }
    }

    /// Parse a command name from wire format.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.as_str() == raw)
    }
}

/// Events pushed to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventName {
    PopupQuote,
    PopupAngelus,
    PopupWelcome,
    PopupHour,
    SettingsChanged,
}

impl EventName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PopupQuote => "popup.quote",
            Self::PopupAngelus => "popup.angelus",
            Self::PopupWelcome => "popup.welcome",
            Self::PopupHour => "popup.hour",
            Self::SettingsChanged => "settings.changed",
        }
    }
}

/// A versioned response envelope from backend host -> frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub v: u32,
    pub request_id: String,
    pub ok: bool,
    pub payload: serde_json::Value,
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Build a successful response envelope.
    #[must_use]
    pub fn ok(request_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: true,
            payload,
            error: None,
        }
    }

    /// Build an error response envelope.
    #[must_use]
    pub fn error(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: false,
            payload: serde_json::Value::Null,
            error: Some(message.into()),
        }
    }
}

/// A versioned command envelope from frontend -> backend host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub v: u32,
    pub request_id: String,
    pub command: CommandName,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl CommandEnvelope {
    /// Build a v1 command envelope.
    #[must_use]
    pub fn new(
        request_id: impl Into<String>,
        command: CommandName,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            command,
            payload,
        }
    }

    /// Validate envelope version and required identifiers.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.v != EVENT_VERSION {
            return Err(ContractError::new(
                ContractErrorKind::UnsupportedVersion,
                format!(
                    "unsupported contract version {}; expected {}",
                    self.v, EVENT_VERSION
                ),
            ));
        }
        if self.request_id.trim().is_empty() {
            return Err(ContractError::new(
                ContractErrorKind::InvalidEnvelope,
                "request_id cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// A versioned event envelope from backend host -> frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub v: u32,
    pub event_id: String,
    pub event: String,
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// Build a v1 event envelope.
    #[must_use]
    pub fn new(
        event_id: impl Into<String>,
        event: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            event_id: event_id.into(),
            event: event.into(),
            payload,
        }
    }
}

/// Contract validation error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractErrorKind {
    UnsupportedVersion,
    InvalidEnvelope,
}

/// Contract validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractError {
    pub kind: ContractErrorKind,
    pub message: String,
}

impl ContractError {
    #[must_use]
    pub fn new(kind: ContractErrorKind, message: String) -> Self {
        Self { kind, message }
    }
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ContractError {}
