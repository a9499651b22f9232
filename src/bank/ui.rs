use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::StyledExt;

use super::*;

/// Full-width action button. Disabled buttons keep their label but drop the
/// click handler.
pub(super) fn action_button(
    id: &'static str,
    label: SharedString,
    accent: Hsla,
    enabled: bool,
    on_click: impl Fn(&ClickEvent, &mut Window, &mut App) + 'static,
) -> impl IntoElement {
    div()
        .id(ElementId::Name(format!("bank-action-{id}").into()))
        .h_flex()
        .items_center()
        .justify_center()
        .w_full()
        .px_4()
        .py(px(12.))
        .rounded(px(10.))
        .bg(if enabled { accent } else { BG_DISABLED() })
        .text_base()
        .font_weight(FontWeight::SEMIBOLD)
        .text_color(if enabled { TEXT_ON_ACCENT() } else { TEXT_DIM() })
        .when(enabled, |el| {
            el.cursor_pointer()
                .hover(|s| s.opacity(0.9))
                .on_click(move |ev, window, cx| on_click(ev, window, cx))
        })
        .child(label)
}

/// Small outlined button used for the wallet chip.
pub(super) fn outline_button(
    id: &'static str,
    label: SharedString,
    on_click: impl Fn(&ClickEvent, &mut Window, &mut App) + 'static,
) -> impl IntoElement {
    div()
        .id(ElementId::Name(format!("bank-outline-{id}").into()))
        .h_flex()
        .items_center()
        .px_3()
        .py(px(6.))
        .rounded_full()
        .border_1()
        .border_color(BORDER_SUBTLE())
        .text_sm()
        .text_color(TEXT_MUTED())
        .cursor_pointer()
        .hover(|s| s.text_color(TEXT_PRIMARY()))
        .on_click(move |ev, window, cx| on_click(ev, window, cx))
        .child(label)
}

pub(super) fn busy_label(base: &'static str, busy: bool) -> SharedString {
    if busy {
        format!("{base}...").into()
    } else {
        base.into()
    }
}
