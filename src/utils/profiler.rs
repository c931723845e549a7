use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct PhaseTiming {
    pub name: String,
    pub duration: Duration,
}

/// Wall-clock time per pipeline phase. Phases recorded under the same name
/// (one lexing pass per source file, say) accumulate into one entry.
#[derive(Debug, Default)]
pub struct Profiler {
    phases: Vec<PhaseTiming>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_phase<T>(&mut self, name: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let value = f();
        self.push_phase(name, start.elapsed());
        value
    }

    pub fn push_phase(&mut self, name: &str, duration: Duration) {
        match self.phases.iter_mut().find(|phase| phase.name == name) {
            Some(phase) => phase.duration += duration,
            None => self.phases.push(PhaseTiming {
                name: name.to_string(),
                duration,
            }),
        }
    }

    pub fn phases(&self) -> &[PhaseTiming] {
        &self.phases
    }

    pub fn total(&self) -> Duration {
        self.phases.iter().map(|phase| phase.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Profiler;

    #[test]
    fn phases_with_the_same_name_accumulate() {
        let mut profiler = Profiler::new();
        profiler.push_phase("Lexing", Duration::from_millis(2));
        profiler.push_phase("Parsing", Duration::from_millis(5));
        profiler.push_phase("Lexing", Duration::from_millis(3));

        let names: Vec<&str> = profiler.phases().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Lexing", "Parsing"]);
        assert_eq!(profiler.phases()[0].duration, Duration::from_millis(5));
        assert_eq!(profiler.total(), Duration::from_millis(10));
    }

    #[test]
    fn record_phase_returns_the_closure_value() {
        let mut profiler = Profiler::new();
        let value = profiler.record_phase("Work", || 21 * 2);
        assert_eq!(value, 42);
        assert_eq!(profiler.phases().len(), 1);
    }
}
