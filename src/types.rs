use serde::Deserialize;

/// One status payload from `GET {base}/system/status`.
///
/// Every subtree is optional: a missing `stats` or `deadlocks` means "no
/// update this tick" for the views that depend on it, never an error.
/// Unknown fields from a richer server are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusSnapshot {
    pub stats: Option<SystemStats>,
    pub deadlocks: Option<DeadlockReport>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemStats {
    pub cpu: Option<Gauge>,
    pub memory: Option<Gauge>,
    pub disk: Option<Gauge>,
    pub swap: Option<Gauge>,
    pub process_count: Option<u64>,
    pub deadlock_risk: Option<f64>,
    pub processes: Option<Vec<ProcessInfo>>,
}

/// A single resource meter. A gauge without a numeric percent counts as
/// absent for rendering purposes.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Gauge {
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessInfo {
    /// Row identity. Zero (or missing) means the row is dropped.
    #[serde(default)]
    pub pid: u32,
    pub name: Option<String>,
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeadlockReport {
    #[serde(default)]
    pub deadlocks_found: bool,
    #[serde(default)]
    pub deadlock_cycles: Vec<DeadlockCycle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeadlockCycle {
    /// Participants in cycle order. A cycle without this list is skipped.
    pub processes: Option<Vec<CycleProcess>>,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CycleProcess {
    #[serde(default)]
    pub pid: u32,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Suggestion {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub process_name: String,
    #[serde(default)]
    pub pid: i64,
    #[serde(default)]
    pub reason: String,
}

/// Reply shape for `POST .../kill` and `.../restart`.
///
/// The defaults matter: deadlockd reports command failures as error statuses
/// with a `{"detail": ..}` body, which deserializes here to an empty message
/// that the notification queue drops.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
