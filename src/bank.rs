//! The bank panel: connect a wallet, watch the contract balance, deposit and
//! withdraw.
//!
//! All decisions live in [`state::BankState`]; this module wires it to gpui.
//! Blocking work (RPC reads, wallet approval) goes through `smol::unblock`
//! and comes back through the view's weak handle, so a closed window turns
//! late results into no-ops.

use std::sync::Arc;

use gpui::*;
use gpui_component::input::{InputEvent, InputState};
use smol::channel::Receiver;

use crate::app_context::BankContext;
use crate::balance::{refetch_channel, wait_for_next_read, RefetchHandle};
use crate::contract::BalanceSource;
use crate::schedule::RefetchScheduler;
use crate::session::SessionSnapshot;
use crate::theme;

mod actions;
mod render;
pub mod state;
mod ui;
pub mod view_model;

use state::BankState;

macro_rules! define_color_fns {
    ($($name:ident => $field:ident),* $(,)?) => {
        $(
            #[allow(non_snake_case)]
            fn $name() -> Hsla { theme::colors().$field }
        )*
    };
}

define_color_fns! {
    BG_PAGE => bg_page,
    BG_CARD => bg_card,
    BG_INPUT => bg_input,
    BG_DISABLED => bg_disabled,
    TEXT_PRIMARY => text_primary,
    TEXT_MUTED => text_muted,
    TEXT_DIM => text_dim,
    TEXT_ON_ACCENT => text_on_accent,
    ACCENT_BLUE => accent_blue,
    ACCENT_RED => accent_red,
    BORDER_SUBTLE => border_subtle,
}

pub struct BankView {
    ctx: Arc<BankContext>,
    state: BankState,
    amount_input: Entity<InputState>,
    refetch: RefetchHandle,
    refetches: RefetchScheduler,
    _balance_poll: Task<()>,
}

impl BankView {
    pub fn new(ctx: Arc<BankContext>, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let amount_input =
            cx.new(|cx| InputState::new(window, cx).placeholder("Enter amount (ETH)"));

        cx.subscribe_in(
            &amount_input,
            window,
            |this: &mut Self, input, event: &InputEvent, _window, cx| match event {
                InputEvent::Change => {
                    let value = input.read(cx).value().to_string();
                    this.state.set_pending_amount(value);
                    cx.notify();
                }
                InputEvent::PressEnter { secondary: false } => this.deposit(cx),
                _ => {}
            },
        )
        .detach();

        let (refetch, refetch_rx) = refetch_channel();
        let balance_poll = Self::spawn_balance_poll(
            ctx.balances.clone(),
            refetch_rx,
            ctx.config.poll_interval,
            cx,
        );

        let mut state = BankState::default();
        state.set_session(ctx.session.snapshot());

        let view = Self {
            refetches: RefetchScheduler::new(ctx.config.refetch_delay),
            ctx,
            state,
            amount_input,
            refetch,
            _balance_poll: balance_poll,
        };
        view.restore_session(cx);
        view
    }

    fn restore_session(&self, cx: &mut Context<Self>) {
        let session = self.ctx.session.clone();
        cx.spawn(async move |this: WeakEntity<Self>, cx: &mut AsyncApp| {
            let restored = smol::unblock(move || {
                session.restore();
                session.snapshot()
            })
            .await;
            if !restored.is_connected() {
                return;
            }
            let _ = this.update(cx, |this, cx| {
                this.apply_session(restored, cx);
            });
        })
        .detach();
    }

    /// Adopt a session snapshot and kick an immediate balance read when the
    /// account changed.
    fn apply_session(&mut self, snapshot: SessionSnapshot, cx: &mut Context<Self>) {
        if self.state.set_session(snapshot) {
            if snapshot.is_connected() {
                self.refetch.refetch();
            } else {
                self.refetches.cancel_all();
            }
        }
        cx.notify();
    }

    /// Single reader loop: one read per interval tick or refetch trigger,
    /// whichever comes first. Reads never overlap.
    fn spawn_balance_poll(
        balances: Arc<dyn BalanceSource>,
        refetch_rx: Receiver<()>,
        interval: std::time::Duration,
        cx: &mut Context<Self>,
    ) -> Task<()> {
        cx.spawn(async move |this: WeakEntity<Self>, cx: &mut AsyncApp| loop {
            let Ok(owner) = this.update(cx, |this, _| this.state.balance().owner()) else {
                break;
            };

            if let Some(owner) = owner {
                let source = balances.clone();
                let result = smol::unblock(move || source.balance_of(owner)).await;
                let applied = this.update(cx, |this, cx| {
                    if this.state.balance_mut().apply(owner, result) {
                        cx.notify();
                    }
                });
                if applied.is_err() {
                    break;
                }
            }

            wait_for_next_read(&refetch_rx, interval).await;
        })
    }
}
