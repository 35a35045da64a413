//! Host command channel and router for the presentation shell.

use crate::error::{JaculatoriaError, Result};
use crate::host::contract::{
    CommandEnvelope, CommandName, EVENT_VERSION, EventEnvelope, EventName, ResponseEnvelope,
};
use crate::power::PowerEvent;
use crate::settings::{Settings, SettingsPatch};
use crate::usecase::{PrayerDto, PrayerRequest, QuoteDto};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, warn};

/// Application operations reachable from the shell.
#[async_trait]
pub trait CommandHandler: Send + Sync + 'static {
    async fn get_quote(&self) -> Result<QuoteDto>;

    async fn get_prayer(&self, request: PrayerRequest) -> Result<PrayerDto>;

    /// Current settings.
    fn get_config(&self) -> Settings;

    /// Validate, apply and persist a settings change.
    fn save_settings(&self, patch: &SettingsPatch) -> Result<Settings>;

    /// Show a quote popup right away.
    fn show_now(&self) -> Result<()>;

    /// Forward an OS power notification.
    fn power_event(&self, event: PowerEvent) -> Result<()>;

    fn stop(&self) -> Result<()> {
        Ok(())
    }
}

/// Broadcast side of the event stream to the shell.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventSink {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event. Returns the number of listeners reached.
    pub fn emit(&self, event: EventName, payload: Value) -> usize {
        let envelope =
            EventEnvelope::new(uuid::Uuid::new_v4().to_string(), event.as_str(), payload);
        self.tx.send(envelope).unwrap_or(0)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }
}

struct HostCommandRequest {
    envelope: CommandEnvelope,
    response_tx: oneshot::Sender<ResponseEnvelope>,
}

#[derive(Clone)]
pub struct HostCommandClient {
    request_tx: mpsc::Sender<HostCommandRequest>,
    events: EventSink,
}

impl HostCommandClient {
    /// Send a command and wait for its response.
    ///
    /// Handler failures come back as error envelopes; `Err` means the
    /// envelope was invalid or the server is gone.
    pub async fn send(&self, envelope: CommandEnvelope) -> Result<ResponseEnvelope> {
        envelope.validate().map_err(|e| {
            JaculatoriaError::Host(format!(
                "invalid host command envelope {}: {}",
                envelope.request_id, e
            ))
        })?;

        let (response_tx, response_rx) = oneshot::channel();
        self.request_tx
            .send(HostCommandRequest {
                envelope,
                response_tx,
            })
            .await
            .map_err(|e| {
                JaculatoriaError::Channel(format!("failed to send host command request: {e}"))
            })?;

        response_rx
            .await
            .map_err(|e| JaculatoriaError::Channel(format!("host command response dropped: {e}")))
    }

    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<EventEnvelope> {
        self.events.subscribe()
    }
}

pub struct HostCommandServer<H: CommandHandler> {
    request_rx: mpsc::Receiver<HostCommandRequest>,
    events: EventSink,
    handler: H,
}

#[must_use]
pub fn command_channel<H: CommandHandler>(
    request_capacity: usize,
    event_capacity: usize,
    handler: H,
) -> (HostCommandClient, HostCommandServer<H>) {
    command_channel_with_events(request_capacity, EventSink::new(event_capacity), handler)
}

/// Create a command channel using an existing event sink.
///
/// The application emits popup events through the same sink, so they
/// reach the shell on the same stream as command-driven events.
#[must_use]
pub fn command_channel_with_events<H: CommandHandler>(
    request_capacity: usize,
    events: EventSink,
    handler: H,
) -> (HostCommandClient, HostCommandServer<H>) {
    let (request_tx, request_rx) = mpsc::channel(request_capacity.max(1));

    (
        HostCommandClient {
            request_tx,
            events: events.clone(),
        },
        HostCommandServer {
            request_rx,
            events,
            handler,
        },
    )
}

impl<H: CommandHandler> HostCommandServer<H> {
    pub async fn run(mut self) {
        while let Some(request) = self.request_rx.recv().await {
            let request_id = request.envelope.request_id.clone();
            let response = match self.route(&request.envelope).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        command = request.envelope.command.as_str(),
                        %request_id,
                        "host command failed: {e}"
                    );
                    ResponseEnvelope::error(request_id, e.to_string())
                }
            };
            let _ = request.response_tx.send(response);
        }
        debug!("host command channel closed");
    }

    /// Route a command envelope to the handler.
    pub async fn route(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let id = envelope.request_id.clone();
        match envelope.command {
            CommandName::Ping => Ok(ResponseEnvelope::ok(id, serde_json::json!({"pong": true}))),
            CommandName::Version => Ok(ResponseEnvelope::ok(
                id,
                serde_json::json!({
                    "contract_version": EVENT_VERSION,
                    "package_version": env!("CARGO_PKG_VERSION"),
                }),
            )),
            CommandName::GetQuote => {
                let quote = self.handler.get_quote().await?;
                Ok(ResponseEnvelope::ok(id, to_payload(&quote)?))
            }
            CommandName::GetPrayer => {
                let request = parse_prayer_request(&envelope.payload)?;
                let prayer = self.handler.get_prayer(request).await?;
                Ok(ResponseEnvelope::ok(id, to_payload(&prayer)?))
            }
            CommandName::GetConfig => {
                Ok(ResponseEnvelope::ok(id, to_payload(&self.handler.get_config())?))
            }
            CommandName::SaveSettings => self.handle_save_settings(envelope),
            CommandName::ShowNow => {
                self.handler.show_now()?;
                Ok(ResponseEnvelope::ok(id, serde_json::json!({"accepted": true})))
            }
            CommandName::PowerResume => self.handle_power(envelope, PowerEvent::Resume),
            CommandName::PowerUnlock => self.handle_power(envelope, PowerEvent::Unlock),
            CommandName::Stop => {
                self.handler.stop()?;
                Ok(ResponseEnvelope::ok(id, serde_json::json!({"stopping": true})))
            }
        }
    }

    fn handle_save_settings(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let patch = self.parse_settings_patch(&envelope.payload)?;
        let settings = self.handler.save_settings(&patch)?;
        let payload = to_payload(&settings)?;

        self.events.emit(EventName::SettingsChanged, payload.clone());

        Ok(ResponseEnvelope::ok(envelope.request_id.clone(), payload))
    }

    /// Build the patch field by field. Mistyped fields are reported together
    /// with the range violations of the well-typed ones.
    fn parse_settings_patch(&self, payload: &Value) -> Result<SettingsPatch> {
        let Value::Object(object) = payload else {
            return Err(JaculatoriaError::Host(
                "save-settings requires an object payload".to_owned(),
            ));
        };
        let (patch, mut violations) = SettingsPatch::from_json(object);
        if violations.is_empty() {
            return Ok(patch);
        }
        let (_, out_of_range) = self.handler.get_config().apply_lenient(&patch);
        violations.extend(out_of_range);
        Err(JaculatoriaError::InvalidSettings(violations))
    }

    fn handle_power(
        &self,
        envelope: &CommandEnvelope,
        event: PowerEvent,
    ) -> Result<ResponseEnvelope> {
        self.handler.power_event(event)?;
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"accepted": true, "event": event}),
        ))
    }
}

fn to_payload<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| JaculatoriaError::Host(format!("failed to serialize payload: {e}")))
}

fn parse_prayer_request(payload: &Value) -> Result<PrayerRequest> {
    if payload.is_null() {
        return Ok(PrayerRequest::default());
    }
    serde_json::from_value(payload.clone())
        .map_err(|e| JaculatoriaError::Host(format!("get-prayer: invalid payload: {e}")))
}
