//! Operator log channel notifications.
//!
//! Notifications are advisory: they are sent on a spawned task and never
//! delay or fail the action that produced them.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::{ChannelId, PlatformGateway};

#[derive(Clone)]
pub struct OperatorLog {
    gateway: Arc<dyn PlatformGateway>,
    channel: Option<ChannelId>,
}

impl OperatorLog {
    pub fn new(gateway: Arc<dyn PlatformGateway>, channel: Option<ChannelId>) -> Self {
        Self { gateway, channel }
    }

    /// Post `line` to the log channel in the background.
    ///
    /// Returns `None` when no log channel is configured.
    pub fn notify(&self, line: impl Into<String>) -> Option<JoinHandle<()>> {
        let channel = self.channel.clone()?;
        let gateway = self.gateway.clone();
        let line = line.into();
        Some(tokio::spawn(async move {
            if let Err(e) = gateway.send_message(&channel, &line).await {
                tracing::debug!("Operator log notification dropped: {}", e);
            }
        }))
    }
}
