use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: &'static str,
    pub duration: Duration,
}

/// Wall-clock durations of the stages a single job went through.
#[derive(Debug, Default, Clone)]
pub struct StageTimings {
    steps: Vec<StepTiming>,
}

impl StageTimings {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step(&mut self, name: &'static str, duration: Duration) {
        self.steps.push(StepTiming { name, duration });
    }

    pub fn record(&mut self, (name, duration): (&'static str, Duration)) {
        self.add_step(name, duration);
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    pub fn get_step(&self, name: &str) -> Option<Duration> {
        self.steps
            .iter()
            .filter(|s| s.name == name)
            .map(|s| s.duration)
            .reduce(|a, b| a + b)
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    /// One-line summary such as `debay=812.4ms normalize=230.1ms total=1042.5ms`.
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = self
            .steps
            .iter()
            .map(|s| format!("{}={:.1}ms", s.name, s.duration.as_secs_f64() * 1000.0))
            .collect();
        parts.push(format!(
            "total={:.1}ms",
            self.total_duration().as_secs_f64() * 1000.0
        ));
        parts.join(" ")
    }
}

pub struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    pub fn stop(self) -> (&'static str, Duration) {
        (self.name, self.start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lists_steps_and_total() {
        let mut timings = StageTimings::new();
        timings.add_step("debay", Duration::from_millis(10));
        timings.add_step("normalize", Duration::from_millis(5));

        assert_eq!(timings.total_duration(), Duration::from_millis(15));
        assert_eq!(timings.get_step("debay"), Some(Duration::from_millis(10)));
        assert_eq!(timings.get_step("cleanup"), None);
        assert_eq!(timings.summary(), "debay=10.0ms normalize=5.0ms total=15.0ms");
    }
}
