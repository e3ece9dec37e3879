use std::rc::Rc;

use gtk4::{gio, glib, prelude::*, subclass::prelude::*};
use tunglyph_data::{settings::Settings, state::TunnelState};

use crate::{
    dialogs::{self, DialogKind},
    icons::IconProvider,
};

/// Smallest tray icon we're willing to render, whatever the settings say
const MIN_TRAY_ICON_SIZE: i32 = 16;

glib::wrapper! {
    pub struct Tunglyph(ObjectSubclass<underlying::Tunglyph>) @extends gio::Application, gtk4::Application, @implements gio::ActionGroup, gio::ActionMap;
}

impl Default for Tunglyph {
    fn default() -> Self {
        Self::new()
    }
}

impl Tunglyph {
    pub fn new() -> Self {
        glib::Object::builder()
            .property("application-id", "dev.tunglyph")
            .property("flags", gio::ApplicationFlags::HANDLES_COMMAND_LINE)
            .build()
    }

    pub fn icons(&self) -> Rc<IconProvider> {
        self.imp().icons.clone()
    }

    pub fn tunnel_state(&self) -> TunnelState {
        self.imp().state.get()
    }

    /// Records the state reported by the tunnel manager and updates the tray icon to match.
    pub fn set_tunnel_state(&self, state: TunnelState) {
        let imp = self.imp();
        let previous = imp.state.replace(state);
        if previous != state {
            tracing::info!("Tunnel went from {previous} to {state}");
        }

        let Some(Some(tray)) = imp.tray.get() else {
            return;
        };

        let settings = Settings::open();
        let size = settings.tray_icon_size().max(MIN_TRAY_ICON_SIZE);

        match imp
            .icons
            .glyph_for_state(state, size, settings.badge_tray_icon())
        {
            Ok(glyph) => tray.show(state, &glyph),
            Err(why) => tracing::error!("Failed to render the tray icon for {state}: {why}"),
        }
    }

    /// Opens a dialog of `kind` once the main loop gets to it, or raises it if it's already open.
    pub fn open_dialog(&self, kind: DialogKind) {
        // Dialogs block until dismissed, each one gets its own idle source so that it doesn't stop
        // whatever asked for it from handling further requests.
        let app = self.clone();
        glib::idle_add_local_once(move || app.run_dialog(kind));
    }

    fn run_dialog(&self, kind: DialogKind) {
        let imp = self.imp();
        let parent = self.active_window();

        let res = imp.dialogs.open(kind, || match kind {
            DialogKind::About => dialogs::about::build(self.icons(), parent.as_ref()),
            DialogKind::Status => {
                dialogs::status::build(&imp.icons, self.tunnel_state(), parent.as_ref())
            }
        });

        if let Err(why) = res {
            tracing::error!("Failed to open the {kind:?} dialog: {why}");
        }
    }
}

mod underlying {
    use std::{
        cell::{Cell, OnceCell},
        ffi::OsString,
        rc::Rc,
    };

    use gtk4::{gio, glib, prelude::*, subclass::prelude::*};
    use once_cell::sync::Lazy;
    use tunglyph_data::state::TunnelState;

    use crate::{
        dialogs::{DialogKind, DialogRegistry},
        feed,
        icons::IconProvider,
        systray::{self, TrayIcon},
    };

    #[derive(Debug)]
    pub struct Tunglyph {
        pub(super) icons: Rc<IconProvider>,
        pub(super) dialogs: DialogRegistry<gtk4::Window>,
        pub(super) state: Cell<TunnelState>,
        pub(super) tray: OnceCell<Option<TrayIcon>>,
        requested_dialog: Cell<Option<DialogKind>>,
    }

    impl Default for Tunglyph {
        fn default() -> Self {
            Self {
                icons: Rc::new(IconProvider::new()),
                dialogs: DialogRegistry::default(),
                state: Cell::new(TunnelState::Unknown),
                tray: OnceCell::new(),
                requested_dialog: Cell::new(None),
            }
        }
    }

    #[glib::object_subclass]
    impl ObjectSubclass for Tunglyph {
        const NAME: &'static str = "Tunglyph";
        type Type = super::Tunglyph;
        type ParentType = gtk4::Application;
    }

    impl ObjectImpl for Tunglyph {}

    const LONG: usize = 1;

    static ABOUT_FLAGS_OS: Lazy<Vec<OsString>> =
        Lazy::new(|| vec!["-a".into(), "--about".into()]);
    const ABOUT_FLAGS: &[&str] = &["-a", "--about"];
    static STATUS_FLAGS_OS: Lazy<Vec<OsString>> =
        Lazy::new(|| vec!["-s".into(), "--status".into()]);
    const STATUS_FLAGS: &[&str] = &["-s", "--status"];

    impl ApplicationImpl for Tunglyph {
        fn activate(&self) {
            self.parent_activate();

            let app = self.obj();

            // The tray and the state feed only make sense once per process, activate is called
            // again each time another instance gets launched.
            let mut first_activation = false;
            self.tray.get_or_init(|| {
                first_activation = true;
                systray::init(&app)
            });

            if first_activation {
                feed::spawn(&app);
                app.set_tunnel_state(self.state.get());
            }

            if let Some(kind) = self.requested_dialog.take() {
                app.open_dialog(kind);
            }
        }

        // This is called in the primary instance
        fn command_line(&self, command_line: &gio::ApplicationCommandLine) -> glib::ExitCode {
            for argument in command_line.arguments() {
                if ABOUT_FLAGS_OS.contains(&argument) {
                    self.requested_dialog.set(Some(DialogKind::About));
                } else if STATUS_FLAGS_OS.contains(&argument) {
                    self.requested_dialog.set(Some(DialogKind::Status));
                }
            }

            self.obj().activate();

            glib::ExitCode::SUCCESS
        }

        // This is called in remote instances
        fn local_command_line(
            &self,
            arguments: &mut gio::subclass::ArgumentList,
        ) -> Option<glib::ExitCode> {
            let prog_name = glib::prgname().unwrap_or_else(|| "tunglyph".into());
            let usage = format!(
                r#"Usage:
  {prog_name} [OPTION...]

Reads tunnel states (stopped, starting, started, stopping, unknown) from stdin, one per line,
and shows them in the system tray.

Help Options:
  -h, --help           Show help options

Application Options:
  -a, --about          Show the about dialog
  -s, --status         Show the tunnel status (mutually exclusive with -a)
"#
            );

            if arguments.contains(&"-h".into()) || arguments.contains(&"--help".into()) {
                eprintln!("{usage}");
                return Some(glib::ExitCode::SUCCESS);
            }

            let about = arguments.iter().any(|os| ABOUT_FLAGS_OS.contains(os));
            let status = arguments.iter().any(|os| STATUS_FLAGS_OS.contains(os));

            if about && status {
                eprintln!(
                    "{}: {} and {} are mutually exclusive\n{}",
                    prog_name, ABOUT_FLAGS[LONG], STATUS_FLAGS[LONG], usage
                );
                return Some(glib::ExitCode::FAILURE);
            }

            None
        }

        fn startup(&self) {
            self.parent_startup();

            // This hold has no matching release intentionally so that the application keeps running
            // in the background with only the tray icon around.
            std::mem::forget(self.obj().hold());

            #[cfg(not(tunglyph_linting))]
            {
                if let Err(why) = gio::resources_register_include!("compiled.gresource") {
                    tracing::error!("Failed loading resources: {why}");
                }
            }

            gtk4::Window::set_default_icon_name("tunglyph");
        }
    }

    impl GtkApplicationImpl for Tunglyph {}
}
