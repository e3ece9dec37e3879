use std::{cell::Cell, rc::Rc};

use gtk4::{gdk, prelude::*};

use super::{close_button, new_dialog, picture_for, texture_for, Error};
use crate::icons::{IconProvider, STATUS_LIBRARY};

const LOGO_SIZE: i32 = 128;

pub fn build(
    icons: Rc<IconProvider>,
    parent: Option<&gtk4::Window>,
) -> Result<gtk4::Window, Error> {
    let window = new_dialog(parent, "About tunglyph")?;

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 10);
    content.set_margin_top(20);
    content.set_margin_bottom(20);
    content.set_margin_start(80);
    content.set_margin_end(80);

    let logo = picture_for(icons.logo_image(LOGO_SIZE), "logo");
    logo.add_controller(flip_through_library(&logo, icons));
    content.append(&logo);

    let name = gtk4::Label::new(Some("tunglyph"));
    name.add_css_class("title-1");
    content.append(&name);

    let version = gtk4::Label::new(Some(env!("CARGO_PKG_VERSION")));
    version.add_css_class("dim-label");
    content.append(&version);

    let close = close_button(&window);
    content.append(&close);

    window.set_child(Some(&content));
    window.set_default_widget(Some(&close));

    Ok(window)
}

/// Right clicking the logo shows the next icon of the status library, once the library runs out
/// the logo comes back.
fn flip_through_library(logo: &gtk4::Picture, icons: Rc<IconProvider>) -> gtk4::GestureClick {
    let gesture = gtk4::GestureClick::new();
    gesture.set_button(gdk::BUTTON_SECONDARY);

    let logo = logo.downgrade();
    let next_index = Cell::new(0);
    gesture.connect_released(move |_, _, _, _| {
        let Some(logo) = logo.upgrade() else {
            return;
        };

        let index = next_index.get();
        let icon = icons
            .system_icon(STATUS_LIBRARY, index, LOGO_SIZE)
            .ok()
            .as_ref()
            .and_then(texture_for);

        if let Some(icon) = icon {
            logo.set_paintable(Some(&icon));
            next_index.set(index + 1);
            return;
        }

        next_index.set(0);
        match icons.logo_image(LOGO_SIZE) {
            Ok(surface) => logo.set_paintable(texture_for(&surface).as_ref()),
            Err(why) => tracing::warn!("Failed to load the logo: {why}"),
        }
    });

    gesture
}
