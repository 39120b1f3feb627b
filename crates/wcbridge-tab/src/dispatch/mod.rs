//! Command dispatch: one task per command arriving from the relay.

use std::sync::Arc;

use wcbridge_common::protocol::{
    decode_params, SignPersonalMessageParams, SignTransactionParams, SignTypedDataParams,
    UnlockParams,
};
use wcbridge_common::{Action, CommandEnvelope, ReplyEnvelope, ReplyPayload};

use crate::client::ClientError;
use crate::context::TabContext;
use crate::display::CallResult;
use crate::typed_data::typed_data_hash;

pub const NOT_CONNECTED: &str = "not connected!";
pub const NOT_SUPPORTED: &str = "Not supported";
pub const NO_SESSION: &str = "no signing session";

/// Runs once per dispatched command when dropped: clears the pending
/// indicator this command raised and calls the cleanup hook.
pub(crate) struct CleanupGuard {
    ctx: Arc<TabContext>,
    action: Action,
    requested: bool,
}

impl CleanupGuard {
    pub(crate) fn new(ctx: Arc<TabContext>, action: Action) -> Self {
        Self {
            ctx,
            action,
            requested: false,
        }
    }

    fn begin_request(&mut self, address: &str) {
        if !self.requested {
            self.requested = true;
            self.ctx.begin_request(address);
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if self.requested {
            self.ctx.end_request();
        }
        if let Some(hook) = self.ctx.cleanup_hook() {
            hook(&self.action);
        }
    }
}

/// Fence, dispatch and answer one command.
pub(crate) async fn handle_command(ctx: Arc<TabContext>, command: CommandEnvelope) {
    let mut guard = CleanupGuard::new(ctx.clone(), command.action.clone());
    tracing::debug!(action = %command.action, id = ?command.id, "Command from relay");

    if let Err(rejection) = ctx.check_fence(&command) {
        ctx.send_reply(&rejection);
        return;
    }
    if let Some(reply) = dispatch(&ctx, &command, &mut guard).await {
        ctx.send_reply(&reply);
    }
}

/// Work out the reply to `command`. Connection-checks produce none.
pub(crate) async fn dispatch(
    ctx: &TabContext,
    command: &CommandEnvelope,
    guard: &mut CleanupGuard,
) -> Option<ReplyEnvelope> {
    let reply = match &command.action {
        Action::ConnectionCheck => {
            if ctx.is_connected() {
                ctx.broadcast_status(true);
            }
            return None;
        }
        Action::Unlock => unlock(ctx, command),
        Action::SignTransaction => sign_transaction(ctx, command, guard).await,
        Action::SignPersonalMessage => sign_personal_message(ctx, command, guard).await,
        Action::SignTypedData => sign_typed_data(ctx, command, guard).await,
        Action::Unsupported(name) => {
            tracing::warn!(action = %name, "Unsupported action");
            ReplyEnvelope::error(command, NOT_SUPPORTED)
        }
    };
    Some(reply)
}

fn unlock(ctx: &TabContext, command: &CommandEnvelope) -> ReplyEnvelope {
    let snapshot = ctx.snapshot();
    if !snapshot.connected() {
        return ReplyEnvelope::error(command, NOT_CONNECTED);
    }
    // All session accounts are returned; the index is informational.
    match decode_params::<UnlockParams>(&command.action, &command.params) {
        Ok(params) => tracing::debug!(addr_index = params.addr_index, "Unlock"),
        Err(e) => tracing::debug!(error = %e, "Unlock without usable params"),
    }
    ReplyEnvelope::ok(
        command,
        ReplyPayload::Accounts {
            accounts: snapshot.accounts,
        },
    )
}

async fn sign_transaction(
    ctx: &TabContext,
    command: &CommandEnvelope,
    guard: &mut CleanupGuard,
) -> ReplyEnvelope {
    let Some(client) = ctx.signing_client() else {
        return ReplyEnvelope::error(command, NO_SESSION);
    };
    let params: SignTransactionParams = match decode_params(&command.action, &command.params) {
        Ok(p) => p,
        Err(e) => return ReplyEnvelope::error(command, e.to_string()),
    };

    guard.begin_request(&params.address);
    let outcome = client.sign_transaction(&params.tx).await;

    let to = params.tx.to.clone().unwrap_or_else(|| "null".into());
    let value = format!("{} ETH", params.tx.value.as_deref().unwrap_or("0"));
    finish(ctx, command, outcome, |result, _| CallResult::SignTransaction {
        from: params.address.clone(),
        to,
        value,
        result,
    })
}

async fn sign_personal_message(
    ctx: &TabContext,
    command: &CommandEnvelope,
    guard: &mut CleanupGuard,
) -> ReplyEnvelope {
    let Some(client) = ctx.signing_client() else {
        return ReplyEnvelope::error(command, NO_SESSION);
    };
    let params: SignPersonalMessageParams =
        match decode_params(&command.action, &command.params) {
            Ok(p) => p,
            Err(e) => return ReplyEnvelope::error(command, e.to_string()),
        };

    guard.begin_request(&params.address);
    let outcome = client
        .sign_personal_message(&params.message, &params.address)
        .await;

    finish(ctx, command, outcome, |result, valid| CallResult::PersonalSign {
        address: params.address.clone(),
        valid,
        result,
    })
}

async fn sign_typed_data(
    ctx: &TabContext,
    command: &CommandEnvelope,
    guard: &mut CleanupGuard,
) -> ReplyEnvelope {
    let Some(client) = ctx.signing_client() else {
        return ReplyEnvelope::error(command, NO_SESSION);
    };
    let params: SignTypedDataParams = match decode_params(&command.action, &command.params) {
        Ok(p) => p,
        Err(e) => return ReplyEnvelope::error(command, e.to_string()),
    };

    guard.begin_request(&params.address);
    let outcome = client
        .sign_typed_data(&params.address, &params.signing_payload())
        .await;

    finish(ctx, command, outcome, |result, valid| CallResult::SignTypedData {
        address: params.address.clone(),
        valid,
        hash: valid.then(|| typed_data_hash(&params)),
        result,
    })
}

/// Record the outcome for display and turn it into a reply.
fn finish(
    ctx: &TabContext,
    command: &CommandEnvelope,
    outcome: Result<String, ClientError>,
    record: impl FnOnce(String, bool) -> CallResult,
) -> ReplyEnvelope {
    match outcome {
        Ok(sig) => {
            let result = record(sig.clone(), true);
            tracing::info!(method = result.method(), id = ?command.id, "Request signed");
            ctx.show_result(result);
            ReplyEnvelope::ok(command, ReplyPayload::Sig { sig })
        }
        Err(e) => {
            let result = record(e.message.clone(), false);
            tracing::warn!(method = result.method(), id = ?command.id, error = %e, "Signing failed");
            ctx.show_result(result);
            ReplyEnvelope::error(command, e.message)
        }
    }
}
