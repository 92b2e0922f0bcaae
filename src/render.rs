use crate::notify::NoticeView;
use crate::series::RiskSeries;
use crate::types::{DeadlockCycle, DeadlockReport, ProcessInfo, StatusSnapshot, SystemStats};

/// Display operations the renderer drives. Implementations replace whole
/// sections; nothing here is diffed against prior state.
pub trait DashboardSurface: Send {
    fn set_tiles(&mut self, tiles: StatTiles);
    fn set_risk(&mut self, risk: RiskView);
    fn replace_processes(&mut self, rows: Vec<ProcessRow>);
    fn replace_alerts(&mut self, alerts: AlertsView);
    fn set_last_update(&mut self, stamp: &str);
    fn set_notices(&mut self, notices: Vec<NoticeView>);
    fn refresh(&mut self);
}

/// The four headline meters, preformatted. `swap` is filled when the service
/// reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatTiles {
    pub cpu: String,
    pub memory: String,
    pub disk: String,
    pub swap: Option<String>,
    pub process_count: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub fn from_score(risk: f64) -> Self {
        if risk < 0.3 {
            Self::Low
        } else if risk < 0.7 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskView {
    pub percent: String,
    pub band: RiskBand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRow {
    pub pid: u32,
    pub name: String,
    pub cpu: String,
    pub memory: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertBlock {
    /// Participants in cycle order, already joined with arrows.
    pub participants: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlertsView {
    /// The static "no deadlocks" placeholder.
    Clear,
    Deadlocked(Vec<AlertBlock>),
}

/// Map one snapshot onto the surface and the risk series.
///
/// Defensive at every level: a snapshot without `stats` renders nothing at
/// all, and each section degrades independently to "no update" when its
/// fields are missing, rather than partially corrupting the display.
pub fn apply(snapshot: &StatusSnapshot, surface: &mut dyn DashboardSurface, series: &mut RiskSeries) {
    let Some(stats) = &snapshot.stats else {
        return;
    };

    if let Some(tiles) = tiles_view(stats) {
        surface.set_tiles(tiles);
    }

    if let Some(risk) = risk_view(stats.deadlock_risk) {
        surface.set_risk(risk);
    }

    if let Some(processes) = &stats.processes {
        surface.replace_processes(process_rows(processes));
    }

    surface.replace_alerts(alerts_view(snapshot.deadlocks.as_ref()));

    if let Some(stamp) = &snapshot.timestamp {
        surface.set_last_update(stamp);
    }

    series.record(stats.deadlock_risk);
}

fn pct(value: f64) -> String {
    format!("{:.1}%", value)
}

/// All three core meters must carry a numeric percent, or the tile group is
/// skipped as a whole.
fn tiles_view(stats: &SystemStats) -> Option<StatTiles> {
    let cpu = stats.cpu.as_ref()?.percent?;
    let memory = stats.memory.as_ref()?.percent?;
    let disk = stats.disk.as_ref()?.percent?;
    Some(StatTiles {
        cpu: pct(cpu),
        memory: pct(memory),
        disk: pct(disk),
        swap: stats.swap.as_ref().and_then(|g| g.percent).map(pct),
        process_count: stats.process_count.unwrap_or(0).to_string(),
    })
}

fn risk_view(risk: Option<f64>) -> Option<RiskView> {
    let risk = risk.filter(|r| r.is_finite())?;
    Some(RiskView {
        percent: pct(risk * 100.0),
        band: RiskBand::from_score(risk),
    })
}

fn process_rows(processes: &[ProcessInfo]) -> Vec<ProcessRow> {
    processes
        .iter()
        .filter(|p| p.pid != 0)
        .map(|p| ProcessRow {
            pid: p.pid,
            name: p.name.clone().unwrap_or_else(|| "Unknown".to_string()),
            cpu: pct(p.cpu_percent.unwrap_or(0.0)),
            memory: pct(p.memory_percent.unwrap_or(0.0)),
            status: p.status.clone().unwrap_or_else(|| "Unknown".to_string()),
        })
        .collect()
}

fn alerts_view(report: Option<&DeadlockReport>) -> AlertsView {
    let Some(report) = report else {
        return AlertsView::Clear;
    };
    if !report.deadlocks_found {
        return AlertsView::Clear;
    }
    let blocks: Vec<AlertBlock> = report
        .deadlock_cycles
        .iter()
        .filter_map(alert_block)
        .collect();
    AlertsView::Deadlocked(blocks)
}

fn alert_block(cycle: &DeadlockCycle) -> Option<AlertBlock> {
    let processes = cycle.processes.as_ref()?;
    let participants = processes
        .iter()
        .map(|p| {
            format!(
                "{} ({})",
                p.name.as_deref().unwrap_or("unknown"),
                p.pid
            )
        })
        .collect::<Vec<_>>()
        .join(" → ");
    let suggestions = cycle
        .suggestions
        .iter()
        .map(|s| format!("{} {} ({}) - {}", s.action, s.process_name, s.pid, s.reason))
        .collect();
    Some(AlertBlock {
        participants,
        suggestions,
    })
}
