use crate::notify::{NoticeKind, NoticeView};
use crate::render::{AlertsView, DashboardSurface, ProcessRow, RiskBand, RiskView, StatTiles};
use crate::series::ChartSink;
use colored::Colorize;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

const SPARK_GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[1;1H";

/// Shared screen buffer behind the two display handles. The renderer writes
/// through `TermSurface`, the risk series through `TermChart`; `refresh`
/// repaints the whole frame from whatever both have stored.
struct TermScreen {
    tiles: Option<StatTiles>,
    risk: Option<RiskView>,
    processes: Vec<ProcessRow>,
    alerts: AlertsView,
    last_update: Option<String>,
    notices: Vec<NoticeView>,
    chart: VecDeque<(String, f64)>,
    color: bool,
    clear_on_refresh: bool,
}

impl TermScreen {
    fn paint(&self) -> String {
        let mut out = String::new();

        let title = if self.color {
            "deadlockd dashboard".bold().to_string()
        } else {
            "deadlockd dashboard".to_string()
        };
        match &self.last_update {
            Some(stamp) => {
                let stamp = format!("last update {stamp}");
                let stamp = if self.color {
                    stamp.dimmed().to_string()
                } else {
                    stamp
                };
                out.push_str(&format!("{title}    {stamp}\n\n"));
            }
            None => out.push_str(&format!("{title}\n\n")),
        }

        if let Some(tiles) = &self.tiles {
            out.push_str(&format!(
                "  CPU {:<8} Memory {:<8} Disk {:<8}",
                tiles.cpu, tiles.memory, tiles.disk
            ));
            if let Some(swap) = &tiles.swap {
                out.push_str(&format!(" Swap {swap:<8}"));
            }
            out.push_str(&format!(" Processes {}\n\n", tiles.process_count));
        }

        if let Some(risk) = &self.risk {
            let band = band_label(risk.band);
            let line = format!("Deadlock risk: {} ({})", risk.percent, band);
            let line = if self.color {
                match risk.band {
                    RiskBand::Low => line.green().to_string(),
                    RiskBand::Medium => line.yellow().to_string(),
                    RiskBand::High => line.red().bold().to_string(),
                }
            } else {
                line
            };
            out.push_str(&format!("  {line}\n"));
        }

        if !self.chart.is_empty() {
            let spark: String = self.chart.iter().map(|(_, r)| spark_glyph(*r)).collect();
            let (stamp, _) = self.chart.back().unwrap();
            out.push_str(&format!("  {spark}  as of {stamp}\n"));
        }
        out.push('\n');

        if !self.processes.is_empty() {
            out.push_str(&format!(
                "  {:<8} {:<20} {:<8} {:<8} {}\n",
                "PID", "NAME", "CPU%", "MEM%", "STATUS"
            ));
            for row in &self.processes {
                out.push_str(&format!(
                    "  {:<8} {:<20} {:<8} {:<8} {}\n",
                    row.pid, row.name, row.cpu, row.memory, row.status
                ));
            }
            out.push('\n');
        }

        match &self.alerts {
            AlertsView::Clear => out.push_str("  No deadlocks detected\n"),
            AlertsView::Deadlocked(blocks) => {
                for block in blocks {
                    let header = if self.color {
                        "Deadlock Detected".red().bold().to_string()
                    } else {
                        "Deadlock Detected".to_string()
                    };
                    out.push_str(&format!("  {header}\n"));
                    out.push_str(&format!("  Processes involved: {}\n", block.participants));
                    if !block.suggestions.is_empty() {
                        out.push_str("  Suggested actions:\n");
                        for suggestion in &block.suggestions {
                            out.push_str(&format!("    - {suggestion}\n"));
                        }
                    }
                }
            }
        }

        if !self.notices.is_empty() {
            out.push('\n');
            for notice in &self.notices {
                let line = match notice.kind {
                    NoticeKind::Info => format!("* {}", notice.message),
                    NoticeKind::Error => format!("! {}", notice.message),
                };
                let line = if !self.color {
                    line
                } else if notice.fading {
                    line.dimmed().to_string()
                } else if notice.kind == NoticeKind::Error {
                    line.red().to_string()
                } else {
                    line.cyan().to_string()
                };
                out.push_str(&format!("  {line}\n"));
            }
        }

        out
    }

    fn flush(&self) {
        let mut stdout = std::io::stdout().lock();
        if self.clear_on_refresh {
            let _ = stdout.write_all(CLEAR_SCREEN.as_bytes());
        }
        let _ = stdout.write_all(self.paint().as_bytes());
        let _ = stdout.flush();
    }
}

fn band_label(band: RiskBand) -> &'static str {
    match band {
        RiskBand::Low => "low",
        RiskBand::Medium => "medium",
        RiskBand::High => "high",
    }
}

fn spark_glyph(risk: f64) -> char {
    let idx = (risk.clamp(0.0, 1.0) * (SPARK_GLYPHS.len() - 1) as f64).round() as usize;
    SPARK_GLYPHS[idx]
}

/// Build a connected surface/sink pair over one screen buffer.
pub fn screen(color: bool, clear_on_refresh: bool) -> (TermSurface, TermChart) {
    let screen = Arc::new(Mutex::new(TermScreen {
        tiles: None,
        risk: None,
        processes: Vec::new(),
        alerts: AlertsView::Clear,
        last_update: None,
        notices: Vec::new(),
        chart: VecDeque::new(),
        color,
        clear_on_refresh,
    }));
    (TermSurface(Arc::clone(&screen)), TermChart(screen))
}

pub struct TermSurface(Arc<Mutex<TermScreen>>);

impl DashboardSurface for TermSurface {
    fn set_tiles(&mut self, tiles: StatTiles) {
        self.0.lock().unwrap().tiles = Some(tiles);
    }

    fn set_risk(&mut self, risk: RiskView) {
        self.0.lock().unwrap().risk = Some(risk);
    }

    fn replace_processes(&mut self, rows: Vec<ProcessRow>) {
        self.0.lock().unwrap().processes = rows;
    }

    fn replace_alerts(&mut self, alerts: AlertsView) {
        self.0.lock().unwrap().alerts = alerts;
    }

    fn set_last_update(&mut self, stamp: &str) {
        self.0.lock().unwrap().last_update = Some(stamp.to_string());
    }

    fn set_notices(&mut self, notices: Vec<NoticeView>) {
        self.0.lock().unwrap().notices = notices;
    }

    fn refresh(&mut self) {
        self.0.lock().unwrap().flush();
    }
}

pub struct TermChart(Arc<Mutex<TermScreen>>);

impl ChartSink for TermChart {
    fn append(&mut self, timestamp: &str, risk: f64) {
        self.0
            .lock()
            .unwrap()
            .chart
            .push_back((timestamp.to_string(), risk));
    }

    fn evict_oldest(&mut self) {
        self.0.lock().unwrap().chart.pop_front();
    }

    fn commit(&mut self) {
        // The frame is repainted by the poll tick's refresh; nothing to do
        // until then.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::AlertBlock;

    fn sample_frame(color: bool) -> String {
        let (mut surface, mut chart) = screen(color, false);
        surface.set_tiles(StatTiles {
            cpu: "12.3%".to_string(),
            memory: "55.0%".to_string(),
            disk: "80.0%".to_string(),
            swap: None,
            process_count: "42".to_string(),
        });
        surface.set_risk(RiskView {
            percent: "25.0%".to_string(),
            band: RiskBand::Low,
        });
        surface.replace_processes(vec![ProcessRow {
            pid: 100,
            name: "x".to_string(),
            cpu: "1.2%".to_string(),
            memory: "3.4%".to_string(),
            status: "running".to_string(),
        }]);
        chart.append("12:00:00", 0.25);
        chart.commit();
        surface.0.lock().unwrap().paint()
    }

    #[test]
    fn frame_contains_every_section() {
        let frame = sample_frame(false);
        assert!(frame.contains("CPU 12.3%"));
        assert!(frame.contains("Deadlock risk: 25.0% (low)"));
        let row = frame.lines().find(|l| l.contains("100")).unwrap();
        assert!(row.contains('x') && row.contains("running"));
        assert!(frame.contains("No deadlocks detected"));
        assert!(frame.contains("as of 12:00:00"));
    }

    #[test]
    fn plain_frame_has_no_escape_codes() {
        let frame = sample_frame(false);
        assert!(!frame.contains('\x1b'));
    }

    #[test]
    fn alert_blocks_render_participants_and_suggestions() {
        let (mut surface, _chart) = screen(false, false);
        surface.replace_alerts(AlertsView::Deadlocked(vec![AlertBlock {
            participants: "a (1) → b (2)".to_string(),
            suggestions: vec!["kill a (1) - High CPU usage".to_string()],
        }]));
        let frame = surface.0.lock().unwrap().paint();
        assert!(frame.contains("Deadlock Detected"));
        assert!(frame.contains("Processes involved: a (1) → b (2)"));
        assert!(frame.contains("- kill a (1) - High CPU usage"));
        assert!(!frame.contains("No deadlocks detected"));
    }

    #[test]
    fn notices_render_with_kind_markers() {
        let (mut surface, _chart) = screen(false, false);
        surface.set_notices(vec![
            NoticeView {
                message: "Connected to server".to_string(),
                kind: NoticeKind::Info,
                fading: false,
            },
            NoticeView {
                message: "Connection error. Retrying...".to_string(),
                kind: NoticeKind::Error,
                fading: true,
            },
        ]);
        let frame = surface.0.lock().unwrap().paint();
        assert!(frame.contains("* Connected to server"));
        assert!(frame.contains("! Connection error. Retrying..."));
    }

    #[test]
    fn spark_glyphs_cover_the_range() {
        assert_eq!(spark_glyph(0.0), '▁');
        assert_eq!(spark_glyph(1.0), '█');
        assert_eq!(spark_glyph(2.5), '█');
        assert_eq!(spark_glyph(-1.0), '▁');
    }
}
