use anyhow::Context;
use gesture_engine::logging;
use gesture_engine::mouse_gestures::{read_trace, GestureEngine};
use gesture_engine::settings::Settings;
use std::fs::File;
use std::io::{self, BufReader};
use std::sync::mpsc;

const USAGE: &str = "usage: gesture_replay [--settings <settings.json>] [trace.jsonl]";

/// Replays a JSON-lines input trace through the engine without any OS hook
/// and prints what it recognised.
fn main() -> anyhow::Result<()> {
    let mut settings_path = None;
    let mut trace_path = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => {
                settings_path = Some(args.next().context(USAGE)?);
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ if trace_path.is_none() => trace_path = Some(arg),
            _ => anyhow::bail!(USAGE),
        }
    }

    let settings = match &settings_path {
        Some(path) => {
            Settings::load(path).with_context(|| format!("failed to load settings from {path}"))?
        }
        None => Settings::default(),
    };
    logging::init(settings.debug_logging, settings.log_file.clone());

    let events = match &trace_path {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("failed to open {path}"))?;
            read_trace(BufReader::new(file))?
        }
        None => read_trace(io::stdin().lock())?,
    };
    tracing::info!(count = events.len(), "replaying trace");

    let mut engine = GestureEngine::new(settings.engine_config());
    let (tx, rx) = mpsc::channel::<String>();

    let complete_tx = tx.clone();
    engine.notifier().on_complete(move |gesture| {
        let from = gesture
            .session()
            .map(|session| session.initial_position().to_string())
            .unwrap_or_else(|| "?".to_string());
        let _ = complete_tx.send(format!("gesture {gesture} from {from}"));
    })?;
    let click_tx = tx;
    engine.notifier().on_click_through(move |position| {
        let _ = click_tx.send(format!("click {position}"));
    })?;

    let consumed = events
        .into_iter()
        .filter(|event| engine.handle(*event))
        .count();

    // Subscriber threads exit once the engine's channels are gone, which
    // closes `rx` after the last notification.
    drop(engine);
    let mut recognised = 0usize;
    for line in rx {
        println!("{line}");
        recognised += 1;
    }
    tracing::info!(consumed, recognised, "replay finished");
    Ok(())
}
