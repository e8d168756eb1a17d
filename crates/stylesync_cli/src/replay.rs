//! Script replay against an in-process injector

use anyhow::{Context, Result};
use serde_json::Value;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use stylesync_core::{InjectorOptions, StyleInjector, StyleSyncConfig};
use stylesync_platform::{LocalTransport, WireMessage};
use stylesync_theme::{ColorScheme, SharedBaseTheme};

/// One line of a replay script
#[derive(Debug, PartialEq)]
pub enum ScriptStep {
    /// `{"ambient": "vscode-dark"}` or `{"ambient": null}`
    Ambient(Option<String>),
    /// `{"type": "...", "payload": ...}`
    Message(WireMessage),
}

/// Parse a JSON-lines script. Blank lines and lines starting with `#` are skipped.
pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>> {
    let mut steps = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let value: Value = serde_json::from_str(line)
            .with_context(|| format!("line {}: not valid JSON", index + 1))?;

        let step = match value.get("ambient") {
            Some(Value::Null) => ScriptStep::Ambient(None),
            Some(Value::String(name)) => ScriptStep::Ambient(Some(name.clone())),
            Some(other) => anyhow::bail!(
                "line {}: ambient must be a string or null, got {}",
                index + 1,
                other
            ),
            None => ScriptStep::Message(
                serde_json::from_value(value)
                    .with_context(|| format!("line {}: expected a message envelope", index + 1))?,
            ),
        };
        steps.push(step);
    }
    Ok(steps)
}

/// Replay parameters
pub struct ReplayOptions {
    pub config: StyleSyncConfig,
    pub expecting_dark: bool,
    pub ambient: Option<String>,
}

/// Run `steps` against a fresh injector and return the transcript.
pub fn replay(steps: &[ScriptStep], options: ReplayOptions) -> Result<String> {
    let ambient = SharedBaseTheme::new(options.ambient.as_deref());
    let transport = Arc::new(LocalTransport::new());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);

    let injector = StyleInjector::new(
        InjectorOptions::new(options.expecting_dark)
            .config(options.config)
            .ambient(Arc::new(ambient.clone()))
            .on_dark_changed(move |is_dark| {
                if let Ok(mut events) = sink.lock() {
                    events.push(is_dark);
                }
            }),
    );

    let mut transcript = String::new();
    let registration = injector
        .start(transport.clone())
        .context("failed to start style injector")?;
    flush(&transport, &events, &mut transcript)?;

    for step in steps {
        match step {
            ScriptStep::Ambient(name) => {
                tracing::debug!("ambient base theme -> {:?}", name);
                ambient.set(name.as_deref());
                writeln!(transcript, "ambient {}", name.as_deref().unwrap_or("<none>"))?;
            }
            ScriptStep::Message(wire) => {
                writeln!(transcript, "<- {}", wire.to_json()?)?;
                transport.deliver(&wire.kind, wire.payload.as_ref());
            }
        }
        flush(&transport, &events, &mut transcript)?;
    }

    writeln!(transcript, "{}", injector.render(""))?;
    registration
        .dispose()
        .context("failed to stop style injector")?;
    Ok(transcript)
}

fn flush(
    transport: &LocalTransport,
    events: &Mutex<Vec<bool>>,
    transcript: &mut String,
) -> Result<()> {
    for message in transport.drain_outbox() {
        writeln!(transcript, "-> {}", WireMessage::from(&message).to_json()?)?;
    }

    let fired = match events.lock() {
        Ok(mut guard) => std::mem::take(&mut *guard),
        Err(_) => anyhow::bail!("dark-changed event log poisoned"),
    };
    for is_dark in fired {
        writeln!(transcript, "dark-changed {}", ColorScheme::from_dark(is_dark))?;
    }
    Ok(())
}
