use gtk4::{gio, glib};

#[gsettings_macro::gen_settings(file = "./tunglyph-data/resources/dev.tunglyph.gschema.xml", id = "dev.tunglyph")]
pub struct Settings;

impl Settings {
    pub fn open() -> Self {
        Self::default()
    }
}
