// ============================================================================
// PERF MONITOR - Tiempos de render
// ============================================================================

use std::collections::VecDeque;

const MAX_SAMPLES: usize = 100;
/// Por encima de este tiempo se loguea un warning
pub const SLOW_RENDER_MS: f64 = 100.0;

#[derive(Debug, Default)]
pub struct PerfMonitor {
    samples: VecDeque<f64>,
}

impl PerfMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, label: &str, elapsed_ms: f64) {
        if self.samples.len() == MAX_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back(elapsed_ms);

        if elapsed_ms > SLOW_RENDER_MS {
            log::warn!("🐢 {} lento: {:.1} ms", label, elapsed_ms);
        } else {
            log::debug!("⏱️ {}: {:.1} ms", label, elapsed_ms);
        }
    }

    pub fn average_ms(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// `performance.now()` del navegador (0 fuera del navegador)
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
