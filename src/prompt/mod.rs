//! Interactive prompting
//!
//! The resolution pipeline treats prompting as an opaque blocking call
//! that returns a string. The `Prompter` trait exists so tests can inject
//! scripted answers instead of reading stdin.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Blocking question/answer interface
pub trait Prompter {
    /// Ask for a value; returns the raw line the user entered
    fn ask(&self, question: &str) -> String;

    /// Ask a yes/no question
    fn confirm(&self, question: &str, default_yes: bool) -> bool {
        let suffix = if default_yes { "[Y/n]" } else { "[y/N]" };
        let answer = self.ask(&format!("{} {}", question, suffix));
        let answer = answer.trim().to_lowercase();
        if answer.is_empty() {
            return default_yes;
        }
        matches!(answer.as_str(), "y" | "yes" | "true")
    }
}

/// Prompter that reads stdin and writes the question to stderr
#[derive(Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&self, question: &str) -> String {
        eprint!("{}: ", question);
        let _ = io::stderr().flush();

        let mut line = String::new();
        let stdin = io::stdin();
        if stdin.lock().read_line(&mut line).is_err() {
            return String::new();
        }
        line.trim_end_matches(['\n', '\r']).to_string()
    }
}

/// Scripted prompter for tests: pops pre-seeded answers in order
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<String>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(|a| a.to_string()).collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Questions asked so far, in order
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, question: &str) -> String {
        self.asked.borrow_mut().push(question.to_string());
        self.answers.borrow_mut().pop_front().unwrap_or_default()
    }
}

/// Environment variables that indicate a CI environment
const CI_MARKERS: &[&str] = &["CI", "GITHUB_ACTIONS", "VERCEL", "BUILD_NUMBER"];

/// Whether the current process appears to run under CI
pub fn running_in_ci() -> bool {
    CI_MARKERS.iter().any(|name| {
        std::env::var(name)
            .map(|v| !v.is_empty() && v != "false" && v != "0")
            .unwrap_or(false)
    })
}
