//! Scripted operator for session tests

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::gateway::protocol::Group;

use super::dispatcher::Reaction;
use super::operator::{Operator, TimeBound};
use super::state::Session;

/// Answers every prompt from a fixed script and records what it was shown
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    answers: VecDeque<String>,
    shown: Vec<Reaction>,
    infos: Vec<String>,
    warnings: Vec<String>,
    menus_seen: usize,
}

impl ScriptedOperator {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedOperator {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    pub fn shown(&self) -> &[Reaction] {
        &self.shown
    }

    pub fn infos(&self) -> &[String] {
        &self.infos
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn menus_seen(&self) -> usize {
        self.menus_seen
    }

    fn next_answer(&mut self) -> Result<String> {
        self.answers
            .pop_front()
            .ok_or_else(|| Error::Prompt("script exhausted".into()))
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    async fn identity(&mut self, _default: &str) -> Result<String> {
        self.next_answer()
    }

    async fn menu_choice(&mut self, _session: &Session) -> Result<String> {
        self.menus_seen += 1;
        self.next_answer()
    }

    async fn group_choice(&mut self, _groups: &[Group]) -> Result<String> {
        self.next_answer()
    }

    async fn time_bound(&mut self, _bound: TimeBound) -> Result<String> {
        self.next_answer()
    }

    async fn recipient(&mut self) -> Result<String> {
        self.next_answer()
    }

    async fn message_body(&mut self) -> Result<String> {
        self.next_answer()
    }

    fn show(&mut self, reaction: &Reaction) {
        self.shown.push(reaction.clone());
    }

    fn info(&mut self, text: &str) {
        self.infos.push(text.to_string());
    }

    fn warn(&mut self, text: &str) {
        self.warnings.push(text.to_string());
    }
}
