//! Terminal host for a mounted dashboard.
//!
//! Stdin has exactly one reader. Chat input and the leave prompt both go
//! through it, so an answer typed at the prompt is never read as a chat line.

use crate::session::{NavigationHost, NavigationOutcome, SessionGuard, LEAVE_PROMPT};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, warn};

/// One read from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Stdin closed.
    Eof,
    /// The interrupt fired before a full line arrived.
    Interrupted,
}

/// Terminal stand-in for the browser window. Ctrl-C plays the back button.
pub struct Terminal<R> {
    lines: Lines<R>,
    answer: Option<bool>,
    left: bool,
    quiet: bool,
}

impl Terminal<BufReader<Stdin>> {
    pub fn stdin(quiet: bool) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), quiet)
    }
}

impl<R: AsyncBufRead + Unpin> Terminal<R> {
    pub fn new(reader: R, quiet: bool) -> Self {
        Self {
            lines: reader.lines(),
            answer: None,
            left: false,
            quiet,
        }
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    /// Whether the user confirmed leaving the page.
    pub fn has_left(&self) -> bool {
        self.left
    }

    async fn next_line(&mut self) -> Option<String> {
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read from stdin: {}", e);
                None
            }
        }
    }

    /// Read the next line unless `interrupt` fires first. Reading lines is
    /// cancel safe, so a partly typed line is kept for the next read.
    pub async fn read_input<I: Future>(&mut self, interrupt: I) -> Input {
        tokio::select! {
            biased;
            _ = interrupt => Input::Interrupted,
            line = self.next_line() => match line {
                Some(line) => Input::Line(line),
                None => Input::Eof,
            },
        }
    }

    /// Ask a y/N question on stderr. A closed stdin answers no.
    pub async fn ask_yes_no(&mut self, prompt: &str) -> bool {
        eprint!("\n⚠️  {} [y/N] ", prompt);
        let _ = std::io::stderr().flush();

        self.next_line()
            .await
            .map_or(false, |answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    /// Handle a back press: collect the answer from stdin first, then let
    /// the session's guard act on it.
    pub async fn back_navigation(&mut self, session: &mut SessionGuard) -> NavigationOutcome {
        if session.navigation().is_installed() {
            self.answer = Some(self.ask_yes_no(LEAVE_PROMPT).await);
        }
        session.on_back_navigation(self)
    }

    pub fn spinner(&self, message: &str) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }

    /// Await `request` under a spinner, treating each `interrupt` as a back
    /// press. Returns `None` once the user confirms leaving; the in-flight
    /// result is then discarded.
    pub async fn await_guarded<F, I, S>(
        &mut self,
        request: F,
        message: &str,
        session: &mut SessionGuard,
        mut interrupt: S,
    ) -> Option<F::Output>
    where
        F: Future,
        I: Future,
        S: FnMut() -> I,
    {
        tokio::pin!(request);

        loop {
            let progress = self.spinner(message);
            tokio::select! {
                result = &mut request => {
                    progress.finish_and_clear();
                    return Some(result);
                }
                _ = interrupt() => progress.finish_and_clear(),
            }

            if self.back_navigation(session).await == NavigationOutcome::Left {
                return None;
            }
        }
    }
}

impl<R> NavigationHost for Terminal<R> {
    fn push_current_entry(&mut self) {
        debug!("Staying on the analysis page");
    }

    /// The answer was read by `back_navigation` before the guard asked.
    fn confirm(&mut self, prompt: &str) -> bool {
        let answer = self.answer.take().unwrap_or(false);
        debug!("{} -> {}", prompt, answer);
        answer
    }

    fn leave(&mut self) {
        self.left = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testutil::ScriptedTransport;
    use std::sync::Arc;
    use tokio_test::io::Builder;

    fn mounted_session<R: AsyncBufRead + Unpin>(terminal: &mut Terminal<R>) -> SessionGuard {
        let mut session = SessionGuard::new(Arc::new(ScriptedTransport::new()));
        session.mount(terminal);
        session
    }

    #[tokio::test]
    async fn test_answer_to_leave_prompt_is_not_read_as_chat() {
        let reader = Builder::new()
            .wait(Duration::from_millis(10))
            .read(b"n\n")
            .read(b"what next?\n")
            .build();
        let mut terminal = Terminal::new(BufReader::new(reader), true);
        let mut session = mounted_session(&mut terminal);

        // Ctrl-C lands while a chat line is being read
        assert_eq!(terminal.read_input(async {}).await, Input::Interrupted);
        assert_eq!(terminal.back_navigation(&mut session).await, NavigationOutcome::Stayed);

        let next = terminal.read_input(std::future::pending::<()>()).await;
        assert_eq!(next, Input::Line("what next?".to_string()));
        assert!(!terminal.has_left());
    }

    #[tokio::test]
    async fn test_confirmed_leave() {
        let mut terminal = Terminal::new(BufReader::new(&b"yes\n"[..]), true);
        let mut session = mounted_session(&mut terminal);

        assert_eq!(terminal.back_navigation(&mut session).await, NavigationOutcome::Left);
        assert!(terminal.has_left());
    }

    #[tokio::test]
    async fn test_unguarded_back_press_reads_nothing() {
        let mut terminal = Terminal::new(BufReader::new(&b"hello\n"[..]), true);
        let mut session = SessionGuard::new(Arc::new(ScriptedTransport::new()));

        assert_eq!(terminal.back_navigation(&mut session).await, NavigationOutcome::Unguarded);
        assert_eq!(
            terminal.read_input(std::future::pending::<()>()).await,
            Input::Line("hello".to_string())
        );
    }

    #[tokio::test]
    async fn test_closed_stdin_declines() {
        let mut terminal = Terminal::new(BufReader::new(&b""[..]), true);
        let mut session = mounted_session(&mut terminal);

        assert_eq!(terminal.back_navigation(&mut session).await, NavigationOutcome::Stayed);
        assert_eq!(terminal.read_input(std::future::pending::<()>()).await, Input::Eof);
    }

    #[tokio::test]
    async fn test_await_guarded_keeps_request_until_leave_confirmed() {
        let mut terminal = Terminal::new(BufReader::new(&b"n\ny\n"[..]), true);
        let mut session = mounted_session(&mut terminal);

        let outcome = terminal
            .await_guarded(std::future::pending::<u32>(), "Analyzing", &mut session, || async {})
            .await;

        assert_eq!(outcome, None);
        assert!(terminal.has_left());
    }

    #[tokio::test]
    async fn test_await_guarded_returns_result() {
        let mut terminal = Terminal::new(BufReader::new(&b""[..]), true);
        let mut session = mounted_session(&mut terminal);

        let outcome = terminal
            .await_guarded(async { 7 }, "Analyzing", &mut session, std::future::pending::<()>)
            .await;

        assert_eq!(outcome, Some(7));
    }
}
