use cairo::ImageSurface;
use gtk4::{gdk_pixbuf::Pixbuf, gio};

use crate::{surface_from_pixbuf, LoadError, Result};

/// GResource prefix under which `build.rs` bundles the numbered icons
const PREFIX: &str = "/dev/tunglyph/icons";

pub(crate) fn resource_path(id: u32) -> String {
    format!("{PREFIX}/{id}.png")
}

pub(crate) fn load(id: u32, size: i32) -> Result<ImageSurface> {
    let path = resource_path(id);

    if gio::resources_get_info(&path, gio::ResourceLookupFlags::NONE).is_err() {
        return Err(LoadError::ResourceMissing(id));
    }

    let pixbuf = Pixbuf::from_resource_at_scale(&path, size, size, false).map_err(|source| {
        LoadError::Decode {
            origin: path.clone(),
            source,
        }
    })?;

    surface_from_pixbuf(&pixbuf)
}
