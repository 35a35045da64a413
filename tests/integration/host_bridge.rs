//! JSON-lines bridge driven end to end through an in-memory pipe.

use crate::helpers::Fixture;
use jaculatoria::config::HostConfig;
use jaculatoria::host::run_bridge;
use jaculatoria::liturgy::LiturgicalContext;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};
use tokio::task::JoinHandle;

struct Bridge {
    stdin: DuplexStream,
    stdout: Lines<BufReader<DuplexStream>>,
    task: JoinHandle<jaculatoria::Result<()>>,
    _fixture: Fixture,
}

impl Bridge {
    fn start(fixture: Fixture) -> Self {
        let (app, events) = fixture.app(LiturgicalContext::ordinary());
        let (stdin, bridge_in) = tokio::io::duplex(64 * 1024);
        let (bridge_out, stdout) = tokio::io::duplex(64 * 1024);
        let task = tokio::spawn(run_bridge(
            BufReader::new(bridge_in),
            bridge_out,
            app,
            events,
            HostConfig::default(),
        ));
        Self {
            stdin,
            stdout: BufReader::new(stdout).lines(),
            task,
            _fixture: fixture,
        }
    }

    async fn write(&mut self, line: &str) {
        self.stdin.write_all(line.as_bytes()).await.unwrap();
        self.stdin.write_all(b"\n").await.unwrap();
    }

    async fn next_line(&mut self) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(5), self.stdout.next_line())
            .await
            .expect("bridge output timed out")
            .unwrap()
            .expect("bridge output closed");
        serde_json::from_str(&line).unwrap()
    }

    /// Send a command and return its response, collecting events seen on the way.
    async fn send(&mut self, id: &str, command: &str, payload: Value) -> (Value, Vec<Value>) {
        let envelope = json!({"v": 1, "request_id": id, "command": command, "payload": payload});
        self.write(&envelope.to_string()).await;
        let mut events = Vec::new();
        loop {
            let message = self.next_line().await;
            if message.get("event").is_some() {
                events.push(message);
            } else {
                assert_eq!(message["request_id"], id);
                return (message, events);
            }
        }
    }

    async fn next_event(&mut self) -> Value {
        loop {
            let message = self.next_line().await;
            if message.get("event").is_some() {
                return message;
            }
        }
    }
}

#[tokio::test]
async fn ping_and_version() {
    let mut bridge = Bridge::start(Fixture::new());

    let (pong, _) = bridge.send("r1", "ping", Value::Null).await;
    assert_eq!(pong["ok"], true);
    assert_eq!(pong["payload"]["pong"], true);

    let (version, _) = bridge.send("r2", "version", Value::Null).await;
    assert_eq!(version["payload"]["contract_version"], 1);
}

#[tokio::test]
async fn get_quote_and_prayer() {
    let mut bridge = Bridge::start(Fixture::new());

    let (quote, _) = bridge.send("q1", "get-quote", Value::Null).await;
    assert_eq!(quote["ok"], true, "{quote}");
    assert_eq!(quote["payload"]["text"], "Quote 1");
    assert_eq!(quote["payload"]["day"], 1);

    let (prayer, _) = bridge
        .send("p1", "get-prayer", json!({"forceEasterTime": true}))
        .await;
    assert_eq!(prayer["payload"]["kind"], "regina-caeli");
    assert_eq!(prayer["payload"]["title"], "Regina Caeli");

    let (hour, _) = bridge.send("p2", "get-prayer", json!({"hour": "lauds"})).await;
    assert_eq!(hour["payload"]["title"], "Laudes");
}

#[tokio::test]
async fn save_settings_validates_and_broadcasts() {
    let mut bridge = Bridge::start(Fixture::new());

    let (rejected, _) = bridge
        .send("s1", "save-settings", json!({"interval": 0, "duration": 99}))
        .await;
    assert_eq!(rejected["ok"], false);
    let message = rejected["error"].as_str().unwrap();
    assert!(message.contains("interval"), "{message}");
    assert!(message.contains("duration"), "{message}");

    let (saved, mut events) = bridge
        .send("s2", "save-settings", json!({"interval": 30, "easterTime": true}))
        .await;
    assert_eq!(saved["ok"], true);
    assert_eq!(saved["payload"]["interval"], 30);
    if events.is_empty() {
        events.push(bridge.next_event().await);
    }
    assert_eq!(events[0]["event"], "settings.changed");
    assert_eq!(events[0]["payload"]["easterTime"], true);

    let (config, _) = bridge.send("c1", "get-config", Value::Null).await;
    assert_eq!(config["payload"]["interval"], 30);
}

#[tokio::test]
async fn show_now_pushes_a_quote_popup() {
    let mut bridge = Bridge::start(Fixture::new());

    let (accepted, events) = bridge.send("n1", "show-now", Value::Null).await;
    assert_eq!(accepted["payload"]["accepted"], true);
    let popup = match events.into_iter().next() {
        Some(event) => event,
        None => bridge.next_event().await,
    };
    assert_eq!(popup["event"], "popup.quote");
    assert_eq!(popup["payload"]["quote"]["text"], "Quote 1");
    assert_eq!(popup["payload"]["duration"], 10);
}

#[tokio::test]
async fn malformed_lines_get_parse_errors() {
    let mut bridge = Bridge::start(Fixture::new());

    bridge.write("{not json").await;
    let response = bridge.next_line().await;
    assert_eq!(response["request_id"], "parse-error");
    assert_eq!(response["ok"], false);

    let (pong, _) = bridge.send("r1", "ping", Value::Null).await;
    assert_eq!(pong["ok"], true);
}

#[tokio::test]
async fn stop_ends_the_bridge() {
    let mut bridge = Bridge::start(Fixture::new());

    let (stopping, _) = bridge.send("x1", "stop", Value::Null).await;
    assert_eq!(stopping["payload"]["stopping"], true);

    let result = tokio::time::timeout(Duration::from_secs(5), &mut bridge.task)
        .await
        .expect("bridge did not stop")
        .unwrap();
    assert!(result.is_ok());
}
