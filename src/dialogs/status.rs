use gtk4::prelude::*;
use tunglyph_data::state::TunnelState;

use super::{close_button, new_dialog, picture_for, Error};
use crate::icons::IconProvider;

const GLYPH_SIZE: i32 = 128;
const SHIELD_SIZE: i32 = 16;

pub fn build(
    icons: &IconProvider,
    state: TunnelState,
    parent: Option<&gtk4::Window>,
) -> Result<gtk4::Window, Error> {
    let window = new_dialog(parent, "Tunnel status")?;

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 10);
    content.set_margin_top(20);
    content.set_margin_bottom(20);
    content.set_margin_start(40);
    content.set_margin_end(40);

    content.append(&picture_for(
        icons.overlay_icon_for_state(state, GLYPH_SIZE),
        "status icon",
    ));

    let label = gtk4::Label::new(Some(&state.to_string()));
    label.add_css_class("title-2");
    content.append(&label);

    if state.is_transitional() {
        let spinner = gtk4::Spinner::new();
        spinner.start();
        content.append(&spinner);
    }

    let managed = gtk4::Box::new(gtk4::Orientation::Horizontal, 6);
    managed.set_halign(gtk4::Align::Center);
    managed.append(&picture_for(icons.shield_icon(SHIELD_SIZE), "shield icon"));
    managed.append(&gtk4::Label::new(Some("Managed by the tunnel service")));
    content.append(&managed);

    let close = close_button(&window);
    content.append(&close);

    window.set_child(Some(&content));
    window.set_default_widget(Some(&close));

    Ok(window)
}
