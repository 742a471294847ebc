use std::sync::Mutex;
use std::time::Duration;

/// Append-only line sink for progress and error reporting. The orchestrator
/// writes one line per notable event and never reads anything back.
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        println!("{message}");
    }

    fn warn(&self, message: &str) {
        eprintln!("warning: {message}");
    }

    fn error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

/// Collects lines instead of printing them. Used by tests to assert on
/// message content and ordering.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<String>>,
}

impl MemoryReporter {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }

    fn warn(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(format!("warning: {message}"));
        }
    }

    fn error(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(format!("error: {message}"));
        }
    }
}

pub fn error(message: &str) {
    eprintln!("error: {message}");
}

pub fn batch_summary(
    reporter: &dyn Reporter,
    uploaded: usize,
    total: usize,
    elapsed: Duration,
    dry_run: bool,
) {
    let noun = if uploaded == 1 { "report" } else { "reports" };
    let action = if dry_run { "Would upload" } else { "Uploaded" };

    if total == 0 {
        reporter.info("Summary: no reports to upload");
    } else if uploaded == total {
        reporter.info(&format!(
            "Summary: {action} {uploaded} {noun} in {:.2}s",
            elapsed.as_secs_f64()
        ));
    } else {
        reporter.info(&format!(
            "Summary: {action} {uploaded}/{total} {noun} in {:.2}s",
            elapsed.as_secs_f64()
        ));
    }
}
