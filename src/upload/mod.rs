pub mod batch;
pub mod retry;

pub use batch::{run_batch, BatchResult};
pub use retry::{classify, ClassifiedError, ErrorKind, RetryPolicy};

use std::collections::HashMap;
use std::path::PathBuf;

/// One report file's worth of upload work, bound to a service name and the
/// merged span tag mapping. Constructed once per unique validated candidate;
/// never mutated afterward.
#[derive(Debug, Clone)]
pub struct Payload {
    pub service: String,
    pub span_tags: HashMap<String, String>,
    pub source_path: PathBuf,
}
