//! Terminal prompt

use factura_client::Prompt;
use std::io::{self, BufRead, Write};

/// Alerts on stderr, confirmations read from stdin
///
/// With `assume_yes` every question is answered yes without reading.
pub struct StdinPrompt {
    assume_yes: bool,
}

impl StdinPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

/// `s`, `si`, `sí`, `y`, `yes`; anything else is no
fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    )
}

impl Prompt for StdinPrompt {
    fn alert(&self, message: &str) {
        eprintln!("! {message}");
    }

    fn confirm(&self, question: &str) -> bool {
        if self.assume_yes {
            eprintln!("{question} [s/N] s");
            return true;
        }
        eprint!("{question} [s/N] ");
        let _ = io::stderr().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => is_yes(&line),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read confirmation, assuming no");
                false
            }
        }
    }
}
