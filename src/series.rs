use chrono::Local;
use std::collections::VecDeque;

pub const DEFAULT_WINDOW: usize = 20;

/// Display-side consumer of the risk series. Updates arrive as an
/// append/evict stream and take effect on `commit`.
pub trait ChartSink: Send {
    fn append(&mut self, timestamp: &str, risk: f64);
    fn evict_oldest(&mut self);
    fn commit(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskPoint {
    pub timestamp: String,
    pub risk: f64,
}

/// Rolling (timestamp, risk) buffer feeding a chart sink.
///
/// Eviction happens before the push whenever the pre-push length exceeds the
/// window, so the buffer momentarily holds `window + 1` points right after a
/// record and never more; the rendered window is the most recent 20-21
/// points.
pub struct RiskSeries {
    points: VecDeque<RiskPoint>,
    window: usize,
    sink: Box<dyn ChartSink>,
}

impl RiskSeries {
    pub fn new(window: usize, sink: Box<dyn ChartSink>) -> Self {
        Self {
            points: VecDeque::with_capacity(window + 1),
            window,
            sink,
        }
    }

    /// Record one risk sample. Missing or non-finite values are ignored; the
    /// sink is committed synchronously after every accepted sample.
    pub fn record(&mut self, risk: Option<f64>) {
        let Some(risk) = risk else { return };
        if !risk.is_finite() {
            return;
        }

        if self.points.len() > self.window {
            self.points.pop_front();
            self.sink.evict_oldest();
        }

        let timestamp = Local::now().format("%H:%M:%S").to_string();
        self.sink.append(&timestamp, risk);
        self.points.push_back(RiskPoint { timestamp, risk });
        self.sink.commit();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &RiskPoint> {
        self.points.iter()
    }
}
