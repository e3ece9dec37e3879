use crate::app::Tunglyph;

mod sni;

pub use sni::TrayIcon;

/// Creates a systray icon.
///
/// This will attempt to create an systray icon as by trying to use the KDE/freedesktop Status Notifier
/// Item spec.
///
/// tunglyph shall continue running even if a systray icon could not be initialised as
/// desktop environments may choose to not offer support for them or for the protocols we use
/// or the user may be using a WM without one. The dialogs can still be reached from the command line.
pub fn init(app: &Tunglyph) -> Option<TrayIcon> {
    if let Some(tray) = sni::try_init(app) {
        return Some(tray);
    }

    tracing::warn!("Failed to initialise a systray icon. This is not fatal, but the tunnel state won't be shown anywhere.");
    None
}
