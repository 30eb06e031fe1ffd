//! Interactive harness for the transcript router.
//!
//! Reads lines from stdin and submits them as recognizer transcripts.
//! Lines starting with `:` are control commands for simulating the host
//! application (TTS lifecycle, mode switches, resets). Dispatched commands
//! are printed to stdout; tracing goes to stderr.

use async_trait::async_trait;
use quadro_voice::{
    CommandSink, DictationRouter, Mode, ModeHandle, RouterConfig, RoutedCommand, TtsEvent,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Prints every routed command the way a real executor would receive it.
struct PrintSink;

#[async_trait]
impl CommandSink for PrintSink {
    async fn dispatch(&self, command: RoutedCommand) -> bool {
        match command.category {
            Some(category) => println!(
                "[execute] ({:?}/{category:?}) {}",
                command.mode, command.text
            ),
            None => println!("[execute] ({:?}) {}", command.mode, command.text),
        }
        true
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays a clean command feed; set
    // QUADRO_LOG_DIR to divert them to a daily-rotated file instead.
    let mut _appender_guard = None;
    let writer = match std::env::var_os("QUADRO_LOG_DIR") {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "quadro-repl.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            _appender_guard = Some(guard);
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(non_blocking)
        }
        None => tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stderr),
    };
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (tts_tx, tts_rx) = mpsc::unbounded_channel();
    let mode = ModeHandle::new(Mode::Command);
    let handle = DictationRouter::spawn(
        RouterConfig::default(),
        mode,
        Arc::new(PrintSink),
        tts_rx,
    );

    println!("quadro-repl — type transcripts, :help for control commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(control) = line.strip_prefix(':') {
            match control.split_once(' ').unwrap_or((control, "")) {
                ("help", _) => {
                    println!(":tts <text>   simulate assistant speech starting");
                    println!(":done         simulate assistant speech completed");
                    println!(":cancel       simulate assistant speech cancelled");
                    println!(":mode <m>     writing | command | ai");
                    println!(":reset        clear pending/in-flight state");
                    println!(":restart      restart intake, clear echo filter");
                    println!(":quit         exit");
                }
                ("tts", text) if !text.is_empty() => {
                    let _ = tts_tx.send(TtsEvent::Started {
                        text: text.to_owned(),
                    });
                }
                ("done", _) => {
                    let _ = tts_tx.send(TtsEvent::Completed);
                }
                ("cancel", _) => {
                    let _ = tts_tx.send(TtsEvent::Cancelled);
                }
                ("mode", name) => match name {
                    "writing" => handle.set_mode(Mode::Writing),
                    "command" => handle.set_mode(Mode::Command),
                    "ai" => handle.set_mode(Mode::Ai),
                    other => eprintln!("unknown mode: {other}"),
                },
                ("reset", _) => handle.reset_for_mode_change(),
                ("restart", _) => handle.restart(),
                ("quit", _) => break,
                (other, _) => eprintln!("unknown control command: :{other}"),
            }
            continue;
        }

        handle.submit(line);
    }

    handle.shutdown();
    Ok(())
}
