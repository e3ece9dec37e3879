use std::thread::Builder as ThreadBuilder;

use cairo::ImageSurface;
use gtk4::{glib, prelude::*};
use ksni::TrayMethods;
use tokio::{
    runtime::Builder as RtBuilder,
    sync::{
        mpsc::{self, Sender},
        watch,
    },
};
use tunglyph_data::state::TunnelState;

use crate::{app::Tunglyph, dialogs::DialogKind};

/// Handle to the tray icon living on the SNI thread.
///
/// Only the latest icon is kept, the tray skips whatever it didn't get around to showing.
#[derive(Debug)]
pub struct TrayIcon {
    tx: watch::Sender<Option<Update>>,
}

impl TrayIcon {
    fn channel() -> (Self, watch::Receiver<Option<Update>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }

    /// Replaces the icon shown in the tray.
    pub fn show(&self, state: TunnelState, glyph: &ImageSurface) {
        let Some(icon) = pixmap_for(glyph) else {
            tracing::error!("Failed to read the pixels of the {state} tray icon");
            return;
        };

        // Nobody listens if the SNI service never came up, which has already been reported
        self.tx.send_replace(Some(Update { state, icon }));
    }
}

#[derive(Clone, Debug)]
struct Update {
    state: TunnelState,
    icon: ksni::Icon,
}

/// Attempts to create a systray icon using the [KDE/freedesktop StatusNotifierItem spec][`kde_sni`].
/// This is done by using the [ksni][`ksni`] crate.
///
/// This will fail gracefully if we could not initialise a systray icon for any reason
///
/// [`kde_sni`]: https://www.freedesktop.org/wiki/Specifications/StatusNotifierItem/StatusNotifierItem/
/// [`ksni`]: https://crates.io/crates/ksni
pub(super) fn try_init(app: &Tunglyph) -> Option<TrayIcon> {
    // We can't invoke GTK methods from threads other than the main one, so we use channels
    // and an async task running on the main thread to invoke GTK stuff from the SNI thread.
    // Icons go the other way, they can only be rendered on the main thread.
    let (tx, mut rx) = mpsc::channel(16);
    let (tray_icon, mut update_rx) = TrayIcon::channel();

    let tray_service = Tray {
        tx,
        state: app.tunnel_state(),
        icon: None,
    };

    // We make a new thread ourselves so we can give it a more descriptive name :^)
    let res = ThreadBuilder::new()
        .name("tray icon thread".into())
        .spawn(move || {
            let rt = match RtBuilder::new_current_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(why) => {
                    tracing::warn!(
                        "Failed to build a runtime for the SNI service. This is not fatal: {why}"
                    );
                    return;
                }
            };

            rt.block_on(async move {
                let handle = match tray_service.spawn().await {
                    Ok(handle) => handle,
                    Err(why) => {
                        tracing::warn!("Failed to run SNI tray service. This is not fatal: {why}");
                        return;
                    }
                };

                while update_rx.changed().await.is_ok() {
                    let latest = update_rx.borrow_and_update().clone();
                    let Some(Update { state, icon }) = latest else {
                        continue;
                    };

                    let applied = handle
                        .update(move |tray: &mut Tray| {
                            tray.state = state;
                            tray.icon = Some(icon);
                        })
                        .await;

                    if applied.is_none() {
                        tracing::warn!("The SNI tray service is gone, dropping icon updates");
                        break;
                    }
                }
            });
        });

    if let Err(why) = res {
        tracing::warn!("Failed to spawn SNI thread. Suspicious, yet not fatal: {why}");
        return None;
    }

    let app = app.clone();
    glib::MainContext::default().spawn_local(async move {
        while let Some(msg) = rx.recv().await {
            match msg {
                Message::OpenDialog(kind) => app.open_dialog(kind),
                Message::Quit => app.quit(),
            }
        }
    });

    Some(tray_icon)
}

#[derive(Debug)]
enum Message {
    OpenDialog(DialogKind),
    Quit,
}

/// Converts an icon to the pixmap format of the SNI spec: ARGB32 in network byte order, not
/// premultiplied.
fn pixmap_for(surface: &ImageSurface) -> Option<ksni::Icon> {
    let width = surface.width();
    let height = surface.height();
    let stride = surface.stride() as usize;
    let row_bytes = width as usize * 4;

    let mut data = Vec::with_capacity(row_bytes * height as usize);
    surface
        .with_data(|pixels| {
            for row in pixels.chunks(stride).take(height as usize) {
                for pixel in row[..row_bytes].chunks_exact(4) {
                    // cairo stores each pixel as a native-endian u32
                    let argb = u32::from_ne_bytes([pixel[0], pixel[1], pixel[2], pixel[3]]);
                    let [a, r, g, b] = argb.to_be_bytes();
                    data.extend_from_slice(&[
                        a,
                        unpremultiply(r, a),
                        unpremultiply(g, a),
                        unpremultiply(b, a),
                    ]);
                }
            }
        })
        .ok()?;

    Some(ksni::Icon {
        width,
        height,
        data,
    })
}

fn unpremultiply(channel: u8, alpha: u8) -> u8 {
    if alpha == 0 {
        return 0;
    }

    let (channel, alpha) = (u16::from(channel), u16::from(alpha));
    ((channel * 255 + alpha / 2) / alpha).min(255) as u8
}

#[derive(Debug)]
struct Tray {
    tx: Sender<Message>,
    state: TunnelState,
    icon: Option<ksni::Icon>,
}

impl Tray {
    fn send(&self, msg: Message) {
        if let Err(why) = self.tx.try_send(msg) {
            tracing::error!("Failed to send message: {why:?}");
        }
    }
}

impl ksni::Tray for Tray {
    fn activate(&mut self, _x: i32, _y: i32) {
        self.send(Message::OpenDialog(DialogKind::Status));
    }

    fn id(&self) -> String {
        "dev.tunglyph".into()
    }

    fn icon_pixmap(&self) -> Vec<ksni::Icon> {
        self.icon.iter().cloned().collect()
    }

    fn menu(&self) -> Vec<ksni::MenuItem<Self>> {
        use ksni::menu::*;
        vec![
            StandardItem {
                label: "Tunnel status".into(),
                activate: Box::new(|tray: &mut Self| {
                    tray.send(Message::OpenDialog(DialogKind::Status));
                }),
                ..Default::default()
            }
            .into(),
            StandardItem {
                label: "About".into(),
                activate: Box::new(|tray: &mut Self| {
                    tray.send(Message::OpenDialog(DialogKind::About));
                }),
                ..Default::default()
            }
            .into(),
            StandardItem {
                label: "Quit".into(),
                icon_name: "application-exit".into(),
                activate: Box::new(|tray: &mut Self| tray.send(Message::Quit)),
                ..Default::default()
            }
            .into(),
        ]
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        ksni::ToolTip {
            icon_name: String::new(),
            icon_pixmap: vec![],
            title: "tunglyph".into(),
            description: format!("Tunnel {}", self.state),
        }
    }

    fn watcher_offline(&self, reason: ksni::OfflineReason) -> bool {
        let why = match reason {
            ksni::OfflineReason::No => "StatusNotifierWatcher went offline without a reason or error".to_string(),
            ksni::OfflineReason::Error(err) => err.to_string(),
            _ => format!("Reason is not known because ksni was updated without the match at {}:{} being updated", file!(), column!())
        };

        tracing::info!("Watcher went offline: {why}");

        true
    }
}

#[cfg(test)]
mod tests {
    use tunglyph_data::state::TunnelState;

    use super::{pixmap_for, unpremultiply, TrayIcon};
    use crate::icons::tests::solid;

    #[test]
    fn unpremultiplies() {
        assert_eq!(unpremultiply(0xff, 0xff), 0xff);
        assert_eq!(unpremultiply(0x40, 0x80), 0x80);
        assert_eq!(unpremultiply(0x12, 0x00), 0x00);
        assert_eq!(unpremultiply(0x00, 0x80), 0x00);
    }

    #[test]
    fn pixmap_is_argb_in_network_order() {
        let icon = pixmap_for(&solid(3, 2, 0xff112233)).unwrap();

        assert_eq!((icon.width, icon.height), (3, 2));
        assert_eq!(icon.data.len(), 3 * 2 * 4);
        for pixel in icon.data.chunks_exact(4) {
            assert_eq!(pixel, [0xff, 0x11, 0x22, 0x33]);
        }
    }

    #[test]
    fn translucent_pixels_are_unpremultiplied() {
        let icon = pixmap_for(&solid(1, 1, 0x80402000)).unwrap();

        assert_eq!(icon.data, [0x80, 0x80, 0x40, 0x00]);
    }

    #[test]
    fn bursts_leave_the_latest_state() {
        let (tray, mut rx) = TrayIcon::channel();

        for (state, argb) in [
            (TunnelState::Starting, 0xff000001),
            (TunnelState::Started, 0xff000002),
            (TunnelState::Stopping, 0xff000003),
            (TunnelState::Stopped, 0xff000004),
            (TunnelState::Starting, 0xff000005),
            (TunnelState::Started, 0xff000006),
        ] {
            tray.show(state, &solid(2, 2, argb));
        }

        assert!(rx.has_changed().unwrap());
        let update = rx.borrow_and_update().clone().unwrap();
        assert_eq!(update.state, TunnelState::Started);
        assert_eq!(&update.icon.data[..4], [0xff, 0x00, 0x00, 0x06]);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn showing_without_a_tray_is_harmless() {
        let (tray, rx) = TrayIcon::channel();
        drop(rx);

        tray.show(TunnelState::Started, &solid(2, 2, 0xff000000));
    }
}
