use crate::client::StatusClient;
use crate::notify::{NoticeKind, NotificationQueue};
use log::warn;
use std::sync::Arc;

/// Relays kill/restart commands to the service and reports the outcome
/// through the notification queue. The process table is never touched from
/// here: the next successful poll is the sole source of truth.
pub struct ActionDispatcher {
    client: StatusClient,
    notices: Arc<NotificationQueue>,
}

impl ActionDispatcher {
    pub fn new(client: StatusClient, notices: Arc<NotificationQueue>) -> Self {
        Self { client, notices }
    }

    pub async fn kill(&self, pid: u32) {
        if pid == 0 {
            return;
        }
        match self.client.kill_process(pid).await {
            Ok(reply) => self.report(reply.success, &reply.message),
            Err(err) => {
                warn!("[actions] kill {pid} failed: {err}");
                self.notices.push("Failed to kill process", NoticeKind::Error);
            }
        }
    }

    pub async fn restart(&self, pid: u32) {
        if pid == 0 {
            return;
        }
        match self.client.restart_process(pid).await {
            Ok(reply) => self.report(reply.success, &reply.message),
            Err(err) => {
                warn!("[actions] restart {pid} failed: {err}");
                self.notices
                    .push("Failed to restart process", NoticeKind::Error);
            }
        }
    }

    fn report(&self, success: bool, message: &str) {
        let kind = if success {
            NoticeKind::Info
        } else {
            NoticeKind::Error
        };
        self.notices.push(message, kind);
    }
}
