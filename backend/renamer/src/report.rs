//! Timing comparison across backends.

use std::time::Duration;

/// Wall-clock time of one batch under a display label.
#[derive(Debug, Clone, PartialEq)]
pub struct RunTiming {
    pub label: String,
    pub elapsed: Duration,
}

/// How much faster `other` was than `baseline`, in percent.
///
/// Negative when `other` was slower. `None` for a zero baseline.
pub fn improvement_pct(baseline: Duration, other: Duration) -> Option<f64> {
    let base = baseline.as_secs_f64();
    if base == 0.0 {
        return None;
    }
    Some((base - other.as_secs_f64()) / base * 100.0)
}

/// Timings of several batches; the first one pushed is the baseline.
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    runs: Vec<RunTiming>,
}

impl Comparison {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, elapsed: Duration) {
        self.runs.push(RunTiming {
            label: label.into(),
            elapsed,
        });
    }

    pub fn runs(&self) -> &[RunTiming] {
        &self.runs
    }

    pub fn baseline(&self) -> Option<&RunTiming> {
        self.runs.first()
    }

    /// `Time <label>: <secs> seconds` per run, then one improvement line per
    /// non-baseline run.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .runs
            .iter()
            .map(|r| format!("Time {}: {:.2} seconds", r.label, r.elapsed.as_secs_f64()))
            .collect();

        if let Some(base) = self.baseline() {
            for run in &self.runs[1..] {
                match improvement_pct(base.elapsed, run.elapsed) {
                    Some(pct) => lines.push(format!(
                        "Improvement {} vs {}: {:.1}%",
                        base.label, run.label, pct
                    )),
                    None => lines.push(format!(
                        "Improvement {} vs {}: n/a",
                        base.label, run.label
                    )),
                }
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn improvement_against_baseline() {
        let pct = improvement_pct(Duration::from_secs(10), Duration::from_secs(4)).unwrap();
        assert!((pct - 60.0).abs() < 1e-9);

        let slower = improvement_pct(Duration::from_secs(10), Duration::from_secs(15)).unwrap();
        assert!((slower + 50.0).abs() < 1e-9);

        assert_eq!(improvement_pct(Duration::ZERO, Duration::from_secs(1)), None);
    }

    #[test]
    fn summary_lists_times_then_improvements() {
        let mut cmp = Comparison::new();
        cmp.push("CPU", Duration::from_millis(12_500));
        cmp.push("Ollama", Duration::from_millis(5_000));
        cmp.push("OpenAI", Duration::from_millis(2_500));

        assert_eq!(cmp.baseline().unwrap().label, "CPU");
        assert_eq!(
            cmp.summary_lines(),
            vec![
                "Time CPU: 12.50 seconds",
                "Time Ollama: 5.00 seconds",
                "Time OpenAI: 2.50 seconds",
                "Improvement CPU vs Ollama: 60.0%",
                "Improvement CPU vs OpenAI: 80.0%",
            ]
        );
    }

    #[test]
    fn empty_and_zero_baseline() {
        assert!(Comparison::new().summary_lines().is_empty());

        let mut cmp = Comparison::new();
        cmp.push("CPU", Duration::ZERO);
        cmp.push("GPU", Duration::from_secs(1));
        assert_eq!(cmp.summary_lines()[2], "Improvement CPU vs GPU: n/a");
    }
}
