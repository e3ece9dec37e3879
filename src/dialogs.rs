use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use gtk4::{gdk, glib, prelude::*};

use crate::icons;

pub mod about;
pub mod status;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("GTK has not been initialised on this thread")]
    GtkNotInitialised,
}

/// The dialogs of which at most one may be open at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DialogKind {
    About,
    Status,
}

/// A surface the user has to dismiss before it goes away.
pub trait ModalSurface: Clone {
    /// Shows the surface and raises it above everything else.
    fn present(&self);

    /// Blocks until the surface is dismissed, however that happens.
    fn run(&self);

    /// Calls `on_dismissed` as soon as the surface is dismissed, even if [`ModalSurface::run`]
    /// can't return yet because another surface is running on top of it.
    fn connect_dismissed<F: Fn() + 'static>(&self, on_dismissed: F);
}

impl ModalSurface for gtk4::Window {
    fn present(&self) {
        GtkWindowExt::present(self);
    }

    fn run(&self) {
        let main_loop = glib::MainLoop::new(None, false);

        let quit_on_close = self.connect_close_request({
            let main_loop = main_loop.clone();
            move |_| {
                main_loop.quit();
                glib::Propagation::Proceed
            }
        });
        let quit_on_destroy = self.connect_destroy({
            let main_loop = main_loop.clone();
            move |_| main_loop.quit()
        });

        GtkWindowExt::present(self);
        main_loop.run();

        self.disconnect(quit_on_close);
        self.disconnect(quit_on_destroy);
    }

    fn connect_dismissed<F: Fn() + 'static>(&self, on_dismissed: F) {
        let on_dismissed = Rc::new(on_dismissed);

        self.connect_close_request({
            let on_dismissed = on_dismissed.clone();
            move |_| {
                on_dismissed();
                glib::Propagation::Proceed
            }
        });
        self.connect_destroy(move |_| on_dismissed());
    }
}

type LiveDialogs<D> = RefCell<HashMap<DialogKind, Registration<D>>>;

#[derive(Debug)]
struct Registration<D> {
    generation: u64,
    dialog: D,
}

/// Keeps track of which dialogs are currently open.
#[derive(Debug)]
pub struct DialogRegistry<D> {
    live: Rc<LiveDialogs<D>>,
    next_generation: Cell<u64>,
}

impl<D> Default for DialogRegistry<D> {
    fn default() -> Self {
        Self {
            live: Rc::new(RefCell::new(HashMap::new())),
            next_generation: Cell::new(0),
        }
    }
}

impl<D: ModalSurface + 'static> DialogRegistry<D> {
    /// Opens a dialog of `kind`, unless one is already open, in which case that one is brought to
    /// the front instead.
    ///
    /// `construct` is only called when a new dialog is needed. Its errors are passed on untouched
    /// and leave nothing registered. A constructed dialog is run to completion before this
    /// returns, but it stops counting as open the moment it's dismissed.
    pub fn open<E, F>(&self, kind: DialogKind, construct: F) -> Result<(), E>
    where
        F: FnOnce() -> Result<D, E>,
    {
        if let Some(live) = self.live(kind) {
            tracing::debug!("{kind:?} dialog is already open, raising it");
            live.present();
            return Ok(());
        }

        let dialog = construct()?;
        let _live = LiveDialog::register(self, kind, dialog.clone());
        dialog.run();

        Ok(())
    }

    pub fn live(&self, kind: DialogKind) -> Option<D> {
        self.live
            .borrow()
            .get(&kind)
            .map(|registration| registration.dialog.clone())
    }
}

/// Drops the registration of `kind`, unless it has been replaced by a newer dialog since.
fn unregister<D>(live: &LiveDialogs<D>, kind: DialogKind, generation: u64) {
    let mut live = live.borrow_mut();
    if live
        .get(&kind)
        .is_some_and(|registration| registration.generation == generation)
    {
        live.remove(&kind);
        tracing::trace!("{kind:?} dialog was dismissed");
    }
}

/// Unregisters its dialog when dropped, so that a panic or an early return can't leave a dialog
/// kind blocked forever.
struct LiveDialog<'r, D> {
    registry: &'r DialogRegistry<D>,
    kind: DialogKind,
    generation: u64,
}

impl<'r, D: ModalSurface + 'static> LiveDialog<'r, D> {
    fn register(registry: &'r DialogRegistry<D>, kind: DialogKind, dialog: D) -> Self {
        let generation = registry.next_generation.get();
        registry.next_generation.set(generation + 1);

        let live = Rc::downgrade(&registry.live);
        dialog.connect_dismissed(move || {
            if let Some(live) = live.upgrade() {
                unregister(&live, kind, generation);
            }
        });

        registry
            .live
            .borrow_mut()
            .insert(kind, Registration { generation, dialog });

        Self {
            registry,
            kind,
            generation,
        }
    }
}

impl<D> Drop for LiveDialog<'_, D> {
    fn drop(&mut self) {
        unregister(&self.registry.live, self.kind, self.generation);
    }
}

/// Turns an icon into something a GTK widget can display.
pub(crate) fn texture_for(surface: &cairo::ImageSurface) -> Option<gdk::Texture> {
    let pixbuf = gdk::pixbuf_get_from_surface(surface, 0, 0, surface.width(), surface.height())?;
    Some(gdk::Texture::for_pixbuf(&pixbuf))
}

/// An image widget showing `surface`, or an empty one if there's nothing to show.
pub(crate) fn picture_for(
    surface: Result<cairo::ImageSurface, icons::Error>,
    what: &str,
) -> gtk4::Picture {
    let picture = gtk4::Picture::new();
    picture.set_can_shrink(false);

    match surface {
        Ok(surface) => match texture_for(&surface) {
            Some(texture) => picture.set_paintable(Some(&texture)),
            None => tracing::warn!("Failed to turn the {what} into a texture"),
        },
        Err(why) => tracing::warn!("Failed to load the {what}: {why}"),
    }

    picture
}

/// Sets up the bits every guarded dialog shares.
pub(crate) fn new_dialog(
    parent: Option<&gtk4::Window>,
    title: &str,
) -> Result<gtk4::Window, Error> {
    if !gtk4::is_initialized_main_thread() {
        return Err(Error::GtkNotInitialised);
    }

    let window = gtk4::Window::builder()
        .title(title)
        .icon_name("tunglyph")
        .resizable(false)
        .modal(parent.is_some())
        .build();
    window.set_transient_for(parent);

    Ok(window)
}

/// A button that closes `window`.
pub(crate) fn close_button(window: &gtk4::Window) -> gtk4::Button {
    let button = gtk4::Button::with_label("Close");
    button.set_halign(gtk4::Align::Center);

    let window = window.downgrade();
    button.connect_clicked(move |_| {
        if let Some(window) = window.upgrade() {
            window.close();
        }
    });

    button
}
