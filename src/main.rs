use gtk4::prelude::*;

mod app;
mod dialogs;
mod feed;
mod icons;
mod logging;
mod systray;

use app::Tunglyph;

fn main() -> gtk4::glib::ExitCode {
    logging::init();

    Tunglyph::new().run()
}
