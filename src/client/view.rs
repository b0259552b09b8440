//! Presentation collaborator for the streaming client.

use std::io::Write;

/// Rendering surface driven by one chat exchange.
///
/// The consumption loop owns the protocol; implementations own every
/// rendering concern: escaping, markdown display, cursor glyphs, scrolling,
/// input locking. `finalize` runs exactly once per exchange (success,
/// cancellation, and error alike) and must leave no placeholder behind,
/// even for an empty reply.
pub trait ChatView {
    /// The submitted message, echoed immediately.
    fn user_turn(&mut self, text: &str);

    /// Show the pending-reply placeholder.
    fn placeholder(&mut self);

    /// First content delta arrived; remove the placeholder animation.
    fn clear_placeholder(&mut self);

    /// Re-render the accumulated partial reply.
    fn partial(&mut self, accumulated: &str);

    /// Inline error replacing the placeholder.
    fn error(&mut self, message: &str);

    /// Final render of the full accumulated text.
    fn finalize(&mut self, full_text: &str);
}

/// Line-oriented view for terminals: prints deltas as they arrive.
#[derive(Debug, Default)]
pub struct TerminalView {
    printed: usize,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

impl ChatView for TerminalView {
    fn user_turn(&mut self, text: &str) {
        println!("you: {text}");
        self.printed = 0;
    }

    fn placeholder(&mut self) {
        print!("bot: ");
        self.flush();
    }

    fn clear_placeholder(&mut self) {}

    fn partial(&mut self, accumulated: &str) {
        // print only what the last render didn't cover
        print!("{}", &accumulated[self.printed..]);
        self.printed = accumulated.len();
        self.flush();
    }

    fn error(&mut self, message: &str) {
        println!("error: {message}");
    }

    fn finalize(&mut self, full_text: &str) {
        if full_text.len() > self.printed {
            print!("{}", &full_text[self.printed..]);
        }
        println!();
        self.printed = 0;
    }
}
