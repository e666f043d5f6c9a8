//! User-facing notices.

use std::sync::Mutex;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    ExportFailed,
    PrintFailed,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::ExportFailed => "导出文档时发生错误，请稍后再试。",
            Notice::PrintFailed => "打印文档时发生错误，请稍后再试。",
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Logs notices at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        warn!(?notice, "{}", notice.message());
    }
}

/// Remembers every notice, for tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
