use alloy_primitives::B256;

use super::state::{BankAction, BankState};
use super::*;

impl BankView {
    pub(super) fn connect_wallet(&mut self, cx: &mut Context<Self>) {
        if self.state.is_connecting() || self.state.session().is_connected() {
            return;
        }
        self.state.set_connecting(true);
        cx.notify();

        let session = self.ctx.session.clone();
        log::info!("[Bank] connecting {} wallet", session.kind().as_str());
        cx.spawn(async move |this: WeakEntity<Self>, cx: &mut AsyncApp| {
            let result = smol::unblock({
                let session = session.clone();
                move || session.connect()
            })
            .await;
            let snapshot = session.snapshot();
            let _ = this.update(cx, |this, cx| {
                this.state.set_connecting(false);
                if let Err(err) = result {
                    log::error!("[Bank] wallet connect failed: {}", err);
                }
                this.apply_session(snapshot, cx);
            });
        })
        .detach();
    }

    pub(super) fn disconnect_wallet(&mut self, cx: &mut Context<Self>) {
        if self.state.submitting().is_some() {
            log::warn!("[Bank] ignoring disconnect while a transaction awaits approval");
            return;
        }
        let session = self.ctx.session.clone();
        cx.spawn(async move |this: WeakEntity<Self>, cx: &mut AsyncApp| {
            let snapshot = smol::unblock(move || {
                session.disconnect();
                session.snapshot()
            })
            .await;
            let _ = this.update(cx, |this, cx| this.apply_session(snapshot, cx));
        })
        .detach();
    }

    pub(super) fn deposit(&mut self, cx: &mut Context<Self>) {
        self.submit(BankAction::Deposit, cx);
    }

    pub(super) fn withdraw(&mut self, cx: &mut Context<Self>) {
        self.submit(BankAction::Withdraw, cx);
    }

    fn submit(&mut self, action: BankAction, cx: &mut Context<Self>) {
        let plan = match self.state.begin_submission(action) {
            Ok(plan) => plan,
            Err(err) => {
                log::warn!("[Bank] {} not submitted: {}", action.as_str(), err);
                cx.notify();
                return;
            }
        };
        cx.notify();

        let call = match plan.action {
            BankAction::Deposit => self.ctx.contract.deposit_call(plan.value),
            BankAction::Withdraw => self.ctx.contract.withdraw_call(),
        };
        let session = self.ctx.session.clone();

        cx.spawn(async move |this: WeakEntity<Self>, cx: &mut AsyncApp| {
            let result = smol::unblock(move || session.submit_transaction(&call)).await;
            let _ = this.update(cx, |this, cx| {
                settle_submission(
                    &mut this.state,
                    &mut this.refetches,
                    &this.refetch,
                    action,
                    result,
                );
                cx.notify();
            });
        })
        .detach();
    }
}

/// Record the wallet's answer and, on success only, queue one delayed
/// balance refetch.
fn settle_submission(
    state: &mut BankState,
    refetches: &mut RefetchScheduler,
    refetch: &RefetchHandle,
    action: BankAction,
    result: Result<B256, String>,
) {
    if state.finish_submission(action, result) {
        log::info!(
            "[Bank] balance refetch in {}ms",
            refetches.delay().as_millis()
        );
        refetches.schedule(refetch.clone());
    }
}
