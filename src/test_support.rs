//! Test doubles shared by the unit tests.

use crate::console::{Console, Level};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Prompt(String),
    Report(String, Level),
}

/// Console that replays canned answers and records everything said.
/// Unscripted questions are answered "no".
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<bool>,
    pub prompts: Vec<String>,
    pub reports: Vec<(String, Level)>,
    pub events: Vec<Event>,
}

impl ScriptedConsole {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            ..Default::default()
        }
    }

    /// Whether any report contains `needle`
    pub fn saw(&self, needle: &str) -> bool {
        self.reports.iter().any(|(m, _)| m.contains(needle))
    }

    pub fn count_level(&self, level: Level) -> usize {
        self.reports.iter().filter(|(_, l)| *l == level).count()
    }

    /// Event index of the first report containing `needle`
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.events
            .iter()
            .position(|e| matches!(e, Event::Report(m, _) if m.contains(needle)))
    }

    /// Event index of the `n`-th prompt
    pub fn prompt_position(&self, n: usize) -> usize {
        self.events
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, Event::Prompt(_)))
            .nth(n)
            .map(|(i, _)| i)
            .expect("prompt was asked")
    }

    pub fn unused_answers(&self) -> usize {
        self.answers.len()
    }
}

impl Console for ScriptedConsole {
    fn confirm(&mut self, question: &str) -> bool {
        self.prompts.push(question.to_string());
        self.events.push(Event::Prompt(question.to_string()));
        self.answers.pop_front().unwrap_or(false)
    }

    fn report(&mut self, message: &str, level: Level) {
        self.reports.push((message.to_string(), level));
        self.events.push(Event::Report(message.to_string(), level));
    }
}
