use std::{fmt, path::PathBuf};

use cairo::{Context, Format, ImageSurface};
use gtk4::{gdk::prelude::GdkCairoContextExt, gdk_pixbuf::Pixbuf, glib};

mod embedded;
mod file;
mod library;

pub use library::IconLibraries;

type Result<T> = std::result::Result<T, LoadError>;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("There is no image file at {0:?}")]
    NotFound(PathBuf),
    #[error("Failed to decode '{origin}': {source}")]
    Decode {
        origin: String,
        #[source]
        source: glib::Error,
    },
    #[error("No embedded resource is bound to id {0}")]
    ResourceMissing(u32),
    #[error("Icon {index} is not available from the '{library}' icon library")]
    LibraryUnavailable { library: String, index: i32 },
    #[error("Can't render an icon at {0}px")]
    InvalidSize(i32),
    #[error("Encountered an error from cairo: {0}")]
    Cairo(#[from] cairo::Error),
}

/// Where a visual can be loaded from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceSource {
    /// An image file on disk, loaded at its native size
    FileImage(PathBuf),
    /// An icon compiled into the binary as a GResource
    Embedded(u32),
    /// An icon from an icon library shipped with the desktop, see [`IconLibraries`]
    SystemLibraryIcon { library: String, index: i32 },
}

impl ResourceSource {
    pub fn system(library: &str, index: i32) -> Self {
        Self::SystemLibraryIcon {
            library: library.to_owned(),
            index,
        }
    }
}

impl fmt::Display for ResourceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileImage(path) => write!(f, "file {}", path.display()),
            Self::Embedded(id) => write!(f, "embedded resource #{id}"),
            Self::SystemLibraryIcon { library, index } => write!(f, "{library}[{index}]"),
        }
    }
}

/// Makes exactly one attempt at turning a [`ResourceSource`] into an image surface.
///
/// Implementations must not retry or fall back to anything else, a failure is final for that
/// source and it's up to the caller to pick the next one.
pub trait ResourceLoader {
    /// `size` is the square size the icon should be rendered at. Sources that have a native size
    /// (i.e. files) are free to ignore it.
    fn load(&self, source: &ResourceSource, size: i32) -> Result<ImageSurface>;
}

/// The loader used by the application, backed by the filesystem, the compiled GResource bundle
/// and the icon libraries found in the XDG data directories.
#[derive(Debug)]
pub struct PlatformLoader {
    libraries: IconLibraries,
}

impl PlatformLoader {
    pub fn new() -> Self {
        Self::with_libraries(IconLibraries::from_xdg())
    }

    pub fn with_libraries(libraries: IconLibraries) -> Self {
        Self { libraries }
    }
}

impl Default for PlatformLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceLoader for PlatformLoader {
    fn load(&self, source: &ResourceSource, size: i32) -> Result<ImageSurface> {
        tracing::trace!("Loading {source} at {size}px");

        if size <= 0 {
            return Err(LoadError::InvalidSize(size));
        }

        match source {
            ResourceSource::FileImage(path) => file::load(path),
            ResourceSource::Embedded(id) => embedded::load(*id, size),
            ResourceSource::SystemLibraryIcon { library, index } => {
                self.libraries.load(library, *index, size)
            }
        }
    }
}

fn surface_from_pixbuf(pixbuf: &Pixbuf) -> Result<ImageSurface> {
    let surface = ImageSurface::create(Format::ARgb32, pixbuf.width(), pixbuf.height())?;

    {
        let cairo = Context::new(&surface)?;
        cairo.set_source_pixbuf(pixbuf, 0.0, 0.0);
        cairo.paint()?;
    }
    surface.flush();

    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::{IconLibraries, LoadError, PlatformLoader, ResourceLoader, ResourceSource};

    #[test]
    fn display() {
        assert_eq!(
            ResourceSource::FileImage("icon/logo.png".into()).to_string(),
            "file icon/logo.png"
        );
        assert_eq!(
            ResourceSource::Embedded(7).to_string(),
            "embedded resource #7"
        );
        assert_eq!(
            ResourceSource::system("tunnel-status", -3).to_string(),
            "tunnel-status[-3]"
        );
    }

    #[test]
    fn empty_sizes_are_refused() {
        let loader = PlatformLoader::with_libraries(IconLibraries::default());

        for size in [0, -32] {
            assert!(matches!(
                loader.load(&ResourceSource::Embedded(7), size),
                Err(LoadError::InvalidSize(s)) if s == size
            ));
            assert!(matches!(
                loader.load(&ResourceSource::system("tunnel-status", -106), size),
                Err(LoadError::InvalidSize(s)) if s == size
            ));
        }
    }
}
