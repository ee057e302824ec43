use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    pub files_scanned: IntCounter,
    pub files_skipped: IntCounter,
    pub matches_found: IntCounter,
    pub tool_calls: IntCounter,
    pub tool_errors: IntCounter,
    registry: Arc<Registry>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn counter(name: &str, help: &str) -> IntCounter {
    // names and help strings are static and well-formed
    IntCounter::with_opts(Opts::new(name, help)).unwrap()
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let files_scanned = counter("files_scanned", "Number of files read and matched");
        let files_skipped = counter(
            "files_skipped",
            "Number of admitted files skipped because they could not be read",
        );
        let matches_found = counter("matches_found", "Number of matches found");
        let tool_calls = counter("tool_calls", "Number of tool invocations");
        let tool_errors = counter("tool_errors", "Number of tool invocations that failed");

        registry.register(Box::new(files_scanned.clone())).ok();
        registry.register(Box::new(files_skipped.clone())).ok();
        registry.register(Box::new(matches_found.clone())).ok();
        registry.register(Box::new(tool_calls.clone())).ok();
        registry.register(Box::new(tool_errors.clone())).ok();

        Metrics {
            files_scanned,
            files_skipped,
            matches_found,
            tool_calls,
            tool_errors,
            registry: Arc::new(registry),
        }
    }

    pub fn gather(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
