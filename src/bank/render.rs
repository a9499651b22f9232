use gpui::prelude::FluentBuilder;
use gpui_component::clipboard::Clipboard;
use gpui_component::input::Input;
use gpui_component::StyledExt;

use super::state::BankAction;
use super::ui::{action_button, busy_label, outline_button};
use super::view_model::{view_model, BankScreen, ConnectedPanel};
use super::*;

impl Render for BankView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if self.state.take_amount_input_reset() {
            self.amount_input
                .update(cx, |state, cx| state.set_value("", window, cx));
        }

        let screen = view_model(&self.state, &self.ctx.config.network_name);
        let body = match screen {
            BankScreen::Disconnected { connecting } => self.render_disconnected(connecting, cx),
            BankScreen::Connected(panel) => self.render_connected(panel, cx),
        };

        div()
            .id("bank-root")
            .size_full()
            .flex()
            .items_center()
            .justify_center()
            .p_4()
            .bg(BG_PAGE())
            .child(
                div()
                    .v_flex()
                    .w_full()
                    .max_w(px(480.))
                    .gap_5()
                    .p_8()
                    .rounded(px(20.))
                    .bg(BG_CARD())
                    .border_1()
                    .border_color(BORDER_SUBTLE())
                    .child(
                        div()
                            .w_full()
                            .text_center()
                            .text_2xl()
                            .font_weight(FontWeight::BOLD)
                            .text_color(TEXT_PRIMARY())
                            .child("💰 EtherBank"),
                    )
                    .child(body),
            )
    }
}

impl BankView {
    fn render_disconnected(&self, connecting: bool, cx: &mut Context<Self>) -> AnyElement {
        div()
            .v_flex()
            .gap_3()
            .child(action_button(
                "connect",
                if connecting {
                    "Waiting for wallet...".into()
                } else {
                    "Connect Wallet".into()
                },
                ACCENT_BLUE(),
                !connecting,
                cx.listener(|this, _, _, cx| this.connect_wallet(cx)),
            ))
            .child(
                div()
                    .w_full()
                    .text_center()
                    .text_xs()
                    .text_color(TEXT_DIM())
                    .child(format!(
                        "Connect a {} wallet on {} to see your balance.",
                        self.ctx.session.kind().as_str(),
                        self.ctx.config.network_name
                    )),
            )
            .into_any_element()
    }

    fn render_connected(&self, panel: ConnectedPanel, cx: &mut Context<Self>) -> AnyElement {
        let idle = panel.busy.is_none();
        let depositing = panel.busy == Some(BankAction::Deposit);
        let withdrawing = panel.busy == Some(BankAction::Withdraw);

        div()
            .v_flex()
            .gap_4()
            .child(
                div()
                    .h_flex()
                    .items_center()
                    .justify_between()
                    .child(
                        div()
                            .v_flex()
                            .gap_1()
                            .child(
                                div()
                                    .h_flex()
                                    .items_center()
                                    .gap_2()
                                    .child(
                                        div()
                                            .text_base()
                                            .font_weight(FontWeight::SEMIBOLD)
                                            .text_color(TEXT_PRIMARY())
                                            .child(panel.address_label.clone()),
                                    )
                                    .child(
                                        Clipboard::new("bank-copy-address")
                                            .value(panel.address.to_checksum(None)),
                                    ),
                            )
                            .child(
                                div()
                                    .text_xs()
                                    .text_color(TEXT_MUTED())
                                    .child(panel.network_name.clone()),
                            ),
                    )
                    .when(idle, |el| {
                        el.child(outline_button(
                            "disconnect",
                            "Disconnect".into(),
                            cx.listener(|this, _, _, cx| this.disconnect_wallet(cx)),
                        ))
                    }),
            )
            .child(
                div()
                    .h_flex()
                    .justify_center()
                    .gap_1()
                    .text_color(TEXT_PRIMARY())
                    .child(
                        div()
                            .font_weight(FontWeight::BOLD)
                            .child("Your contract balance:"),
                    )
                    .child(format!("{} {}", panel.balance_text, panel.symbol)),
            )
            .child(
                div()
                    .v_flex()
                    .gap_1()
                    .child(
                        div()
                            .w_full()
                            .px_3()
                            .py_2()
                            .rounded(px(10.))
                            .bg(BG_INPUT())
                            .border_1()
                            .border_color(if panel.amount_error.is_some() {
                                ACCENT_RED()
                            } else {
                                BORDER_SUBTLE()
                            })
                            .child(
                                Input::new(&self.amount_input)
                                    .appearance(false)
                                    .cleanable(false),
                            ),
                    )
                    .when_some(panel.amount_error.clone(), |el, err| {
                        el.child(div().text_xs().text_color(ACCENT_RED()).child(err))
                    }),
            )
            .child(action_button(
                "deposit",
                busy_label("Deposit", depositing),
                ACCENT_BLUE(),
                idle,
                cx.listener(|this, _, _, cx| this.deposit(cx)),
            ))
            .child(action_button(
                "withdraw",
                busy_label("Withdraw", withdrawing),
                ACCENT_RED(),
                idle,
                cx.listener(|this, _, _, cx| this.withdraw(cx)),
            ))
            .child(
                div()
                    .w_full()
                    .text_center()
                    .text_xs()
                    .text_color(TEXT_DIM())
                    .child(panel.footer),
            )
            .into_any_element()
    }
}
