use std::path::{Path, PathBuf};

use cairo::ImageSurface;
use gtk4::gdk_pixbuf::Pixbuf;

use crate::{surface_from_pixbuf, LoadError, Result};

const EXTENSIONS: &[&str] = &["png", "svg"];

/// Icon libraries shipped with the desktop.
///
/// A library is a flat directory `icons/<library>/` inside one of the search roots, which are the
/// XDG data home followed by the XDG data dirs. Icons are addressed by index:
/// * a negative index names the icon by its resource number, so `-106` is `106.png` (or `.svg`)
/// * a non-negative index is the position of the icon among the library's images, sorted by name
#[derive(Clone, Debug, Default)]
pub struct IconLibraries {
    roots: Vec<PathBuf>,
}

impl IconLibraries {
    pub fn from_xdg() -> Self {
        match xdg::BaseDirectories::new() {
            Ok(dirs) => {
                let mut roots = vec![dirs.get_data_home()];
                roots.extend(dirs.get_data_dirs());
                Self::with_roots(roots)
            }
            Err(why) => {
                tracing::warn!(
                    "Failed to get the XDG data directories, no system icons will be available: {why}"
                );
                Self::default()
            }
        }
    }

    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Finds the directory of `library`, the first root that has it wins.
    fn locate(&self, library: &str) -> Option<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join("icons").join(library))
            .find(|dir| dir.is_dir())
    }

    /// Resolves `index` inside `library` to an icon file, without loading it.
    pub fn resolve(&self, library: &str, index: i32) -> Option<PathBuf> {
        let dir = self.locate(library)?;

        if index < 0 {
            let number = index.unsigned_abs();
            return EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{number}.{ext}")))
                .find(|path| path.is_file());
        }

        let mut icons = std::fs::read_dir(&dir)
            .ok()?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| is_icon(path))
            .collect::<Vec<_>>();
        icons.sort();

        icons.into_iter().nth(index as usize)
    }

    pub(crate) fn load(&self, library: &str, index: i32, size: i32) -> Result<ImageSurface> {
        let unavailable = || LoadError::LibraryUnavailable {
            library: library.to_owned(),
            index,
        };

        let path = self.resolve(library, index).ok_or_else(unavailable)?;
        tracing::trace!("{library}[{index}] resolved to {path:?}");

        let pixbuf = Pixbuf::from_file_at_scale(&path, size, size, false).map_err(|source| {
            LoadError::Decode {
                origin: path.display().to_string(),
                source,
            }
        })?;

        surface_from_pixbuf(&pixbuf)
    }
}

fn is_icon(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}
