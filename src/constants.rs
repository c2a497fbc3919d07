// http
pub const PORT: u16 = 8000;

// layout, relative to the invocation directory
pub const REPO_DIR: &str = "repo";
pub const LOG_DIR: &str = "log";
pub const TEMPLATE_DIR: &str = "template";
pub const TEMPLATE_NAME: &str = "main_template.html";

// history
pub const SKIP_MARKER: &str = "#ignorelog";
pub const SHORT_HASH_LEN: usize = 7;

// reports
pub const HTML_REPORT: &str = "index.html";
pub const MARKDOWN_REPORT: &str = "process_history.md";

// capture readiness probe
pub const READY_ATTRIBUTE: &str = "data-capture-ready";
pub const READY_POLL_INTERVAL_MS: u64 = 250;
