use std::{
    io::{self, BufRead},
    thread::Builder as ThreadBuilder,
};

use gtk4::glib;
use tokio::sync::mpsc;
use tunglyph_data::state::{ParseStateError, TunnelState};

use crate::app::Tunglyph;

/// Starts following the tunnel states written to stdin, one per line.
///
/// The feed stops at the end of stdin, the last state reported stays on display.
pub fn spawn(app: &Tunglyph) {
    let (tx, mut rx) = mpsc::channel(8);

    let res = ThreadBuilder::new()
        .name("state feed thread".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(why) => {
                        tracing::warn!("Stopped reading tunnel states: {why}");
                        break;
                    }
                };

                match parse_line(&line) {
                    Some(Ok(state)) => {
                        if tx.blocking_send(state).is_err() {
                            break;
                        }
                    }
                    Some(Err(why)) => tracing::warn!("Ignoring {line:?}: {why}"),
                    None => {}
                }
            }

            tracing::debug!("Reached the end of the state feed");
        });

    if let Err(why) = res {
        tracing::error!(
            "Failed to spawn the state feed thread, the tunnel state won't change: {why}"
        );
        return;
    }

    let app = app.clone();
    glib::MainContext::default().spawn_local(async move {
        while let Some(state) = rx.recv().await {
            app.set_tunnel_state(state);
        }
    });
}

/// Blank lines and `#` comments carry no state.
fn parse_line(line: &str) -> Option<Result<TunnelState, ParseStateError>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    Some(line.parse())
}
