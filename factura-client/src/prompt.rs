//! User-facing alerts and confirmations
//!
//! The workflow never talks to a terminal or window directly; front ends
//! plug in their own [`Prompt`].

/// Blocking alert/confirm dialog
pub trait Prompt: Send + Sync {
    /// Show a message the user must acknowledge
    fn alert(&self, message: &str);

    /// Ask a yes/no question and wait for the answer
    fn confirm(&self, question: &str) -> bool;
}

/// Headless prompt: alerts go to the log, confirmations get a fixed answer
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPrompt {
    pub auto_confirm: bool,
}

impl LogPrompt {
    pub fn new(auto_confirm: bool) -> Self {
        Self { auto_confirm }
    }
}

impl Prompt for LogPrompt {
    fn alert(&self, message: &str) {
        tracing::warn!(alert = %message, "User alert");
    }

    fn confirm(&self, question: &str) -> bool {
        tracing::info!(question = %question, answer = self.auto_confirm, "Auto-answered confirmation");
        self.auto_confirm
    }
}
