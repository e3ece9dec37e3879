use std::{io, path::Path};

use cairo::ImageSurface;
use gtk4::gdk_pixbuf::Pixbuf;

use crate::{surface_from_pixbuf, LoadError, Result};

pub(crate) fn load(path: &Path) -> Result<ImageSurface> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => return Err(LoadError::NotFound(path.to_owned())),
        Err(why) if why.kind() == io::ErrorKind::NotFound => {
            return Err(LoadError::NotFound(path.to_owned()))
        }
        // Something is there but we can't look at it, let the decoder report why
        Err(_) => {}
    }

    let pixbuf = Pixbuf::from_file(path).map_err(|source| LoadError::Decode {
        origin: path.display().to_string(),
        source,
    })?;

    surface_from_pixbuf(&pixbuf)
}
