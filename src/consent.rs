//! Consent gate: the disclosure shown to users and the prompt that asks them.

use std::io::{self, BufRead, IsTerminal, Write};

/// Disclosure shown when the caller supplies none.
pub const DEFAULT_APPROVAL_MESSAGE: &str = "\
This application collects anonymous usage data to help improve it.
The following information is sent to Google Analytics:
  - a random identifier for this installation (client id)
  - your user id, if the application has set one
  - the names of features you use and the pages you view
  - the hostname the application is served from
No file contents, credentials or other personal data are collected.";

/// Question asked after the disclosure.
pub const APPROVAL_QUESTION: &str = "Do you agree to send usage data? Type 'yes' to accept: ";

/// Source of the user's answer.
///
/// Callers pick the strategy: [`TerminalPrompt`] for an attended terminal,
/// [`PresetPrompt`] for a decision made elsewhere, or any
/// `FnMut(&str) -> Option<String>` closure (handy as a test double).
pub trait ConsentPrompt {
    /// Show the disclosure. Called even when consent is granted
    /// programmatically.
    fn display(&mut self, _message: &str) {}

    /// Ask `question` and return the raw reply, or `None` when nobody is
    /// there to answer.
    fn ask(&mut self, question: &str) -> Option<String>;
}

impl<F> ConsentPrompt for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn ask(&mut self, question: &str) -> Option<String> {
        self(question)
    }
}

/// Prompts on stdout and reads the reply from stdin. Declines to ask when
/// stdin is not a terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl ConsentPrompt for TerminalPrompt {
    fn display(&mut self, message: &str) {
        println!("{message}");
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            log::debug!("[galog] stdin is not a terminal; not prompting for consent");
            return None;
        }
        print!("{question}");
        let _ = io::stdout().flush();

        let mut reply = String::new();
        match stdin.lock().read_line(&mut reply) {
            Ok(_) => Some(reply.trim_end_matches(&['\r', '\n'][..]).to_string()),
            Err(e) => {
                log::warn!("[galog] Failed to read consent reply: {e}");
                None
            }
        }
    }
}

/// Answers with a fixed decision and shows nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetPrompt(pub bool);

impl ConsentPrompt for PresetPrompt {
    fn ask(&mut self, _question: &str) -> Option<String> {
        Some(if self.0 { "yes" } else { "no" }.to_string())
    }
}

/// The caller's message, or [`DEFAULT_APPROVAL_MESSAGE`].
pub fn set_approval_message(message: Option<&str>) -> String {
    message.unwrap_or(DEFAULT_APPROVAL_MESSAGE).to_string()
}

/// Show the disclosure and decide consent.
///
/// `consent_default = true` grants consent without asking; the caller
/// takes responsibility for having obtained it lawfully. Otherwise only the
/// exact reply `"yes"` grants consent.
pub fn request_approval(
    message: Option<&str>,
    consent_default: bool,
    prompt: &mut dyn ConsentPrompt,
) -> bool {
    let message = set_approval_message(message);
    prompt.display(&message);

    if consent_default {
        log::info!("[galog] Consent granted by the application");
        return true;
    }

    let granted = prompt.ask(APPROVAL_QUESTION).as_deref() == Some("yes");
    log::info!(
        "[galog] Consent {}",
        if granted { "granted" } else { "declined" }
    );
    granted
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recording {
        shown: Vec<String>,
        asked: usize,
        reply: Option<String>,
    }

    impl ConsentPrompt for Recording {
        fn display(&mut self, message: &str) {
            self.shown.push(message.to_string());
        }

        fn ask(&mut self, _question: &str) -> Option<String> {
            self.asked += 1;
            self.reply.clone()
        }
    }

    fn recording(reply: Option<&str>) -> Recording {
        Recording {
            shown: Vec::new(),
            asked: 0,
            reply: reply.map(str::to_string),
        }
    }

    #[test]
    fn message_verbatim_or_default() {
        assert_eq!(set_approval_message(Some("hi")), "hi");
        let default = set_approval_message(None);
        assert!(default.lines().count() > 1);
        assert!(default.contains("client id"));
    }

    #[test]
    fn consent_default_skips_question() {
        let mut p = recording(Some("no"));
        assert!(request_approval(None, true, &mut p));
        assert_eq!(p.asked, 0);
        assert_eq!(p.shown, vec![DEFAULT_APPROVAL_MESSAGE.to_string()]);
    }

    #[test]
    fn only_exact_yes_grants() {
        assert!(request_approval(None, false, &mut recording(Some("yes"))));
        for reply in ["Yes", "YES", "y", " yes", "yes ", "no", ""] {
            assert!(
                !request_approval(None, false, &mut recording(Some(reply))),
                "{reply:?} should not grant consent"
            );
        }
    }

    #[test]
    fn unattended_denies() {
        let mut p = recording(None);
        assert!(!request_approval(Some("msg"), false, &mut p));
        assert_eq!(p.asked, 1);
        assert_eq!(p.shown, vec!["msg".to_string()]);
    }

    #[test]
    fn preset_and_closure_prompts() {
        assert!(request_approval(None, false, &mut PresetPrompt(true)));
        assert!(!request_approval(None, false, &mut PresetPrompt(false)));

        let mut asked = Vec::new();
        let mut closure = |q: &str| {
            asked.push(q.to_string());
            Some("yes".to_string())
        };
        assert!(request_approval(None, false, &mut closure));
        assert_eq!(asked, vec![APPROVAL_QUESTION.to_string()]);
    }
}
