use crate::client::StatusSource;
use crate::notify::{NoticeKind, NotificationQueue};
use crate::render::{self, DashboardSurface};
use crate::series::RiskSeries;
use log::{debug, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// The rendering pipeline fed by each poll: the display surface plus the
/// risk series that drives its chart sink. Locked only for short synchronous
/// sections, never across an await.
pub struct Dashboard {
    pub surface: Box<dyn DashboardSurface>,
    pub series: RiskSeries,
}

impl Dashboard {
    pub fn new(surface: Box<dyn DashboardSurface>, series: RiskSeries) -> Self {
        Self { surface, series }
    }
}

struct Chain {
    source: Arc<dyn StatusSource>,
    dashboard: Arc<Mutex<Dashboard>>,
    notices: Arc<NotificationQueue>,
    interval: Duration,
}

/// Two-state poll driver: `Idle` (no live chain task) or `Polling` (exactly
/// one). The chain task handle doubles as the polling flag; `start` checks
/// and replaces it in one synchronous step, so no interleaving can create a
/// second chain.
pub struct Poller {
    source: Arc<dyn StatusSource>,
    dashboard: Arc<Mutex<Dashboard>>,
    notices: Arc<NotificationQueue>,
    interval: Duration,
    chain: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn StatusSource>,
        dashboard: Arc<Mutex<Dashboard>>,
        notices: Arc<NotificationQueue>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            dashboard,
            notices,
            interval,
            chain: None,
        }
    }

    /// Begin polling. A no-op while a chain is already live, which is what
    /// makes racing callers (startup plus a resume signal) safe.
    pub fn start(&mut self) {
        if self.is_polling() {
            debug!("[poller] start ignored: chain already live");
            return;
        }
        self.notices.push("Connected to server", NoticeKind::Info);
        let ctx = Chain {
            source: Arc::clone(&self.source),
            dashboard: Arc::clone(&self.dashboard),
            notices: Arc::clone(&self.notices),
            interval: self.interval,
        };
        self.chain = Some(tokio::spawn(run_chain(ctx)));
        debug!("[poller] chain started");
    }

    /// Cancel the chain. Any pending sleep is cancelled and an in-flight
    /// fetch is dropped at its await point, so nothing is scheduled after
    /// this returns. Safe to call when already idle.
    pub fn stop(&mut self) {
        if let Some(chain) = self.chain.take() {
            chain.abort();
            debug!("[poller] chain stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.chain.as_ref().is_some_and(|c| !c.is_finished())
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_chain(ctx: Chain) {
    loop {
        match ctx.source.fetch_status().await {
            Ok(snapshot) => {
                {
                    let mut guard = ctx.dashboard.lock().unwrap();
                    let dash = &mut *guard;
                    render::apply(&snapshot, dash.surface.as_mut(), &mut dash.series);
                    dash.surface.set_notices(ctx.notices.active());
                    dash.surface.refresh();
                }
                sleep(ctx.interval).await;
            }
            Err(err) => {
                warn!("[poller] status fetch failed: {err}");
                ctx.notices
                    .push("Connection error. Retrying...", NoticeKind::Error);
                repaint_notices(&ctx);
                sleep(ctx.interval).await;
                // Restart in place: the reconnect announcement repeats on
                // every recovery attempt, then the fetch happens immediately.
                ctx.notices.push("Connected to server", NoticeKind::Info);
                repaint_notices(&ctx);
            }
        }
    }
}

fn repaint_notices(ctx: &Chain) {
    let mut dash = ctx.dashboard.lock().unwrap();
    let notices = ctx.notices.active();
    dash.surface.set_notices(notices);
    dash.surface.refresh();
}
