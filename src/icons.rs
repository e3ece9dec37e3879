//! Every icon and image the UI shows for the tunnel.
//!
//! Visuals are derived from the tunnel state and the requested size, the first time they're asked
//! for. After that the same surface is handed out for the rest of the process' life, the
//! expensive part is decoding and scaling so nothing is ever thrown away.

use cairo::ImageSurface;
use tunglyph_data::state::TunnelState;
use tunglyph_resources::{LoadError, PlatformLoader, ResourceLoader, ResourceSource};

use self::{
    cache::{SizeAndLibraryIndex, SizeAndPath, SizeAndResource, SizeAndState, VisualCache},
    mapper::AllSourcesFailed,
};

mod cache;
mod compositor;
mod mapper;
mod scaler;

pub use self::mapper::STATUS_LIBRARY;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("Failed to derive the image: {0}")]
    Derivation(#[from] cairo::Error),
    #[error("None of the {} candidate sources could be loaded", .0.len())]
    AllSourcesFailed(Vec<Error>),
}

impl From<AllSourcesFailed<Error>> for Error {
    fn from(AllSourcesFailed(failures): AllSourcesFailed<Error>) -> Self {
        Self::AllSourcesFailed(failures)
    }
}

/// Owns the visual cache, there's meant to be one of these per application.
///
/// This isn't `Send`, all icon work happens on the UI thread.
#[derive(Debug)]
pub struct IconProvider<L = PlatformLoader> {
    loader: L,
    cache: VisualCache,
}

impl IconProvider {
    pub fn new() -> Self {
        Self::with_loader(PlatformLoader::new())
    }
}

impl Default for IconProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ResourceLoader> IconProvider<L> {
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader,
            cache: VisualCache::default(),
        }
    }

    /// The application logo at `size`x`size`.
    ///
    /// The logo file is tried every time the cache has nothing for it, so a logo dropped in while
    /// we're running shows up for sizes that weren't requested before.
    pub fn logo_image(&self, size: i32) -> Result<ImageSurface, Error> {
        self.resolve(&mapper::logo_sources(), size)
    }

    /// The plain glyph for `state`, without the logo.
    pub fn icon_for_state(&self, state: TunnelState, size: i32) -> Result<ImageSurface, Error> {
        self.cache
            .status
            .get_or_try_insert_with(SizeAndState { size, state }, || {
                self.resolve(&mapper::sources_for(state), size)
            })
    }

    /// The logo with a badge for `state` in its bottom-right corner.
    ///
    /// A stopped tunnel has no badge, neither has a logo too small to fit one. If the badge can't
    /// be loaded the bare logo is returned, the only error is not being able to load the logo
    /// itself.
    pub fn overlay_icon_for_state(
        &self,
        state: TunnelState,
        size: i32,
    ) -> Result<ImageSurface, Error> {
        let key = SizeAndState { size, state };
        if let Some(icon) = self.cache.overlay.get(&key) {
            return Ok(icon);
        }

        let logo = self.logo_image(size)?;
        let bounds = compositor::overlay_bounds(logo.width(), logo.height());
        // Icons too small to fit any badge get the bare logo, like a stopped tunnel
        if state == TunnelState::Stopped || bounds.is_empty() {
            return Ok(self.cache.overlay.insert(key, logo));
        }

        let overlay = match self.icon_for_state(state, bounds.w) {
            Ok(overlay) => overlay,
            Err(why) => {
                tracing::warn!(
                    "Failed to load the badge for {state}, showing the bare logo: {why}"
                );
                return Ok(logo);
            }
        };

        let icon = compositor::composite(&logo, &overlay, size, bounds)?;
        let icon = self.cache.overlay.insert(key, icon);
        tracing::trace!(
            "Composed the {state} icon at {size}px, {} composed icons cached",
            self.cache.overlay.len()
        );

        Ok(icon)
    }

    /// What the tray should show for `state`: the badged logo if `badged` is set and it can be
    /// made, the plain status glyph otherwise.
    pub fn glyph_for_state(
        &self,
        state: TunnelState,
        size: i32,
        badged: bool,
    ) -> Result<ImageSurface, Error> {
        if badged {
            match self.overlay_icon_for_state(state, size) {
                Ok(icon) => return Ok(icon),
                Err(why) => tracing::warn!(
                    "Failed to compose the {state} icon, falling back to the status icon: {why}"
                ),
            }
        }

        self.icon_for_state(state, size)
    }

    pub fn system_icon(&self, library: &str, index: i32, size: i32) -> Result<ImageSurface, Error> {
        self.load(&ResourceSource::system(library, index), size)
    }

    /// The elevation shield shown next to actions that need privileges.
    pub fn shield_icon(&self, size: i32) -> Result<ImageSurface, Error> {
        self.resolve(&mapper::shield_sources(), size)
    }

    fn resolve(&self, sources: &[ResourceSource], size: i32) -> Result<ImageSurface, Error> {
        Ok(mapper::resolve_first(sources, |source| self.load(source, size))?)
    }

    /// Loads a single source at `size`x`size`, going through the table for its kind of source.
    fn load(&self, source: &ResourceSource, size: i32) -> Result<ImageSurface, Error> {
        let derive = || -> Result<ImageSurface, Error> {
            let loaded = self.loader.load(source, size)?;
            let scaled = scaler::stretch(&loaded, size, size)?;
            tracing::debug!("Loaded {source} at {size}px");
            Ok(scaled)
        };

        match source {
            ResourceSource::FileImage(path) => self.cache.files.get_or_try_insert_with(
                SizeAndPath {
                    size,
                    path: path.clone(),
                },
                derive,
            ),
            ResourceSource::Embedded(id) => self
                .cache
                .embedded
                .get_or_try_insert_with(SizeAndResource { size, id: *id }, derive),
            ResourceSource::SystemLibraryIcon { library, index } => {
                self.cache.system.get_or_try_insert_with(
                    SizeAndLibraryIndex {
                        size,
                        index: *index,
                        library: library.clone(),
                    },
                    derive,
                )
            }
        }
    }
}
