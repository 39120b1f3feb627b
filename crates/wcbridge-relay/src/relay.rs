//! The relay run loop: window messages in, broadcast traffic out and back.

use std::sync::Arc;

use wcbridge_channel::{BroadcastPort, Window, WindowHandle, WindowId, WindowMessage, WindowOpener};
use wcbridge_common::{
    Action, BroadcastMessage, CommandEnvelope, RelayError, ReplyEnvelope, RequestId, Target,
};

use crate::context::{RelayContext, RelaySettings};

/// The iframe-side relay between the extension and the bridge tab.
pub struct IframeRelay {
    ctx: Arc<RelayContext>,
    window: Window,
    channel: BroadcastPort,
    parent_id: WindowId,
}

impl IframeRelay {
    /// `window` is the iframe's own window; only messages whose source is
    /// `parent` are accepted.
    pub fn new(
        settings: RelaySettings,
        window: Window,
        parent: WindowHandle,
        channel: BroadcastPort,
        opener: Arc<dyn WindowOpener>,
    ) -> Self {
        let parent_id = parent.id();
        let ctx = RelayContext::new(settings, channel.sender(), window.handle(), parent, opener);
        Self {
            ctx: Arc::new(ctx),
            window,
            channel,
            parent_id,
        }
    }

    pub fn context(&self) -> Arc<RelayContext> {
        self.ctx.clone()
    }

    /// Handle the extension posts commands into.
    pub fn handle(&self) -> WindowHandle {
        self.window.handle()
    }

    /// Run until [`RelayContext::unload`] is called or a substrate closes.
    pub async fn run(mut self) {
        tracing::info!(
            relay = %self.ctx.id,
            channel = self.channel.name(),
            "Relay started"
        );

        loop {
            tokio::select! {
                _ = self.ctx.cancel.cancelled() => break,

                msg = self.window.recv() => match msg {
                    Some(msg) => self.on_window_message(msg),
                    None => break,
                },

                value = self.channel.recv() => match value {
                    Some(value) => self.on_broadcast(value),
                    None => break,
                },
            }
        }

        self.ctx.unload();
        self.channel.close();
    }

    fn on_window_message(&self, msg: WindowMessage) {
        if msg.source != self.parent_id {
            tracing::debug!(origin = %msg.origin, "Ignoring message from non-parent window");
            return;
        }
        let command: CommandEnvelope = match serde_json::from_value(msg.data) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring message that is not a command");
                return;
            }
        };
        if command.target != Target::Iframe {
            tracing::debug!(command_target = ?command.target, "Ignoring command not addressed to relay");
            return;
        }

        let ctx = self.ctx.clone();
        tokio::spawn(handle_command(ctx, command));
    }

    fn on_broadcast(&self, value: serde_json::Value) {
        match BroadcastMessage::classify(&value) {
            BroadcastMessage::Status(status) if status.is_from_tab() => {
                self.ctx.set_tab_ready(status.ready);
            }
            // A status naming a relay is a peer relay's unload frame, not the tab's readiness.
            BroadcastMessage::Status(status) => {
                tracing::debug!(other = ?status.relay, "Another relay unloaded");
            }
            BroadcastMessage::Command(_) => {}
            BroadcastMessage::Reply(reply) => {
                if let Some(relay) = &reply.relay {
                    if relay != &self.ctx.id {
                        tracing::debug!(other = %relay, "Reply addressed to another relay");
                        return;
                    }
                }
                let resolved = self.ctx.pending().resolve(&reply);
                match resolved {
                    Some((id, action)) => {
                        tracing::debug!(request_id = %id, %action, success = reply.success, "Forwarding reply");
                        self.ctx.post_to_parent(&value);
                    }
                    None => {
                        tracing::warn!(action = %reply.action, id = ?reply.id, "Dropping uncorrelated reply");
                    }
                }
            }
            BroadcastMessage::Unknown => {
                tracing::debug!("Forwarding unrecognized broadcast payload as-is");
                self.ctx.post_to_parent(&value);
            }
        }
    }
}

/// Carry one command from the extension to the tab and arm its reply timeout.
async fn handle_command(ctx: Arc<RelayContext>, command: CommandEnvelope) {
    let id = command.id.clone().unwrap_or_default();
    let command = command.with_id(id.clone()).with_relay(ctx.id.clone());
    let action = command.action.clone();
    tracing::debug!(request_id = %id, %action, "Command from extension");

    // 1. Make sure the tab exists and is in front.
    if let Err(e) = ctx.resolve_tab() {
        fail(&ctx, &command, &e);
        return;
    }

    // 2. Hold the command until the tab says it is ready.
    if let Err(e) = ctx.wait_until_ready().await {
        fail(&ctx, &command, &e);
        return;
    }

    // 3. Record and forward. The tab answers a connection-check with a
    // readiness signal, never a reply, so there is nothing to wait for.
    if action == Action::ConnectionCheck {
        if let Err(e) = ctx.channel.post_json(&command.relabel(Target::Tab)) {
            tracing::debug!(request_id = %id, error = %e, "Connection-check not forwarded");
        }
        return;
    }
    let settled = ctx.pending().insert(id.clone(), action.clone());
    let forwarded = command.clone().relabel(Target::Tab);
    if let Err(e) = ctx.channel.post_json(&forwarded) {
        tracing::warn!(request_id = %id, error = %e, "Failed to forward command");
        ctx.pending().remove(&id);
        fail(&ctx, &command, &RelayError::ChannelClosed);
        return;
    }
    tracing::debug!(request_id = %id, %action, "Forwarded command to tab");

    // 4. Safety net for a reply that never comes.
    tokio::select! {
        _ = settled.cancelled() => {}
        _ = ctx.cancel.cancelled() => {}
        _ = tokio::time::sleep(ctx.settings.reply_timeout) => {
            expire(&ctx, &command, &id);
        }
    }
}

fn expire(ctx: &RelayContext, command: &CommandEnvelope, id: &RequestId) {
    let removed = ctx.pending().remove(id);
    if removed.is_some() {
        fail(ctx, command, &RelayError::ReplyTimeout(ctx.settings.reply_timeout));
    }
}

fn fail(ctx: &RelayContext, command: &CommandEnvelope, error: &RelayError) {
    tracing::warn!(
        request_id = ?command.id,
        action = %command.action,
        error = %error,
        "Command failed in relay"
    );
    ctx.post_to_parent(&ReplyEnvelope::error(command, error.to_string()));
}
