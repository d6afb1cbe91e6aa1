//! Scripted in-memory session for exercising flows without a browser

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use autoex_e2e::{E2eError, E2eResult, Session, SessionLauncher};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Goto(String),
    Click(String),
    Fill(String, String),
    Check(String),
    Select(String, String),
    Upload(String, PathBuf),
    AcceptDialog,
    ExpectTitle(String),
    ExpectVisible(String),
    ExpectText(String, String),
    ExpectExactText(String, String),
    ExpectHidden(String),
    ExpectCount(String, usize),
    TextContents(String),
    Screenshot(PathBuf, bool),
    Close,
}

impl Call {
    /// Selector, title or URL the call targets
    fn target(&self) -> Option<&str> {
        match self {
            Call::Goto(s)
            | Call::Click(s)
            | Call::Fill(s, _)
            | Call::Check(s)
            | Call::Select(s, _)
            | Call::Upload(s, _)
            | Call::ExpectTitle(s)
            | Call::ExpectVisible(s)
            | Call::ExpectText(s, _)
            | Call::ExpectExactText(s, _)
            | Call::ExpectHidden(s)
            | Call::ExpectCount(s, _)
            | Call::TextContents(s) => Some(s),
            Call::AcceptDialog | Call::Screenshot(..) | Call::Close => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Failure {
    Timeout,
    Assertion,
}

/// Records every call and succeeds unless told to fail on a target
#[derive(Clone, Default)]
pub struct ScriptedSession {
    pub calls: Arc<Mutex<Vec<Call>>>,
    fail_on: Option<(String, Failure)>,
    texts: HashMap<String, Vec<String>>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, target: &str, failure: Failure) -> Self {
        self.fail_on = Some((target.to_string(), failure));
        self
    }

    pub fn with_texts(mut self, selector: &str, texts: &[&str]) -> Self {
        self.texts
            .insert(selector.to_string(), texts.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&mut self, call: Call) -> E2eResult<()> {
        let failure = match (&self.fail_on, call.target()) {
            (Some((target, failure)), Some(t)) if t == target => Some(*failure),
            _ => None,
        };
        let target = call.target().unwrap_or_default().to_string();
        self.calls.lock().unwrap().push(call);

        match failure {
            Some(Failure::Timeout) => Err(E2eError::Timeout(target)),
            Some(Failure::Assertion) => Err(E2eError::AssertionFailed(target)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Session for ScriptedSession {
    async fn goto(&mut self, url: &str) -> E2eResult<()> {
        self.record(Call::Goto(url.into()))
    }

    async fn click(&mut self, selector: &str) -> E2eResult<()> {
        self.record(Call::Click(selector.into()))
    }

    async fn fill(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        self.record(Call::Fill(selector.into(), value.into()))
    }

    async fn check(&mut self, selector: &str) -> E2eResult<()> {
        self.record(Call::Check(selector.into()))
    }

    async fn select_option(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        self.record(Call::Select(selector.into(), value.into()))
    }

    async fn set_input_files(&mut self, selector: &str, path: &Path) -> E2eResult<()> {
        self.record(Call::Upload(selector.into(), path.to_path_buf()))
    }

    async fn accept_next_dialog(&mut self) -> E2eResult<()> {
        self.record(Call::AcceptDialog)
    }

    async fn expect_title(&mut self, title: &str) -> E2eResult<()> {
        self.record(Call::ExpectTitle(title.into()))
    }

    async fn expect_visible(&mut self, selector: &str) -> E2eResult<()> {
        self.record(Call::ExpectVisible(selector.into()))
    }

    async fn expect_text(&mut self, selector: &str, text: &str) -> E2eResult<()> {
        self.record(Call::ExpectText(selector.into(), text.into()))
    }

    async fn expect_exact_text(&mut self, selector: &str, text: &str) -> E2eResult<()> {
        self.record(Call::ExpectExactText(selector.into(), text.into()))
    }

    async fn expect_hidden(&mut self, selector: &str) -> E2eResult<()> {
        self.record(Call::ExpectHidden(selector.into()))
    }

    async fn expect_count(&mut self, selector: &str, count: usize) -> E2eResult<()> {
        self.record(Call::ExpectCount(selector.into(), count))
    }

    async fn text_contents(&mut self, selector: &str) -> E2eResult<Vec<String>> {
        self.record(Call::TextContents(selector.into()))?;
        Ok(self.texts.get(selector).cloned().unwrap_or_default())
    }

    async fn screenshot(&mut self, path: &Path, full_page: bool) -> E2eResult<()> {
        self.record(Call::Screenshot(path.to_path_buf(), full_page))
    }

    async fn close(&mut self) -> E2eResult<()> {
        self.record(Call::Close)
    }
}

/// Hands out clones of a template session, each with its own call log
#[derive(Clone, Default)]
pub struct ScriptedLauncher {
    template: ScriptedSession,
    pub sessions: Arc<Mutex<Vec<ScriptedSession>>>,
}

impl ScriptedLauncher {
    pub fn new(template: ScriptedSession) -> Self {
        Self {
            template,
            sessions: Arc::default(),
        }
    }

    pub fn launched(&self) -> Vec<ScriptedSession> {
        self.sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    async fn launch(&self) -> E2eResult<Box<dyn Session>> {
        let mut session = self.template.clone();
        session.calls = Arc::default();
        self.sessions.lock().unwrap().push(session.clone());
        Ok(Box::new(session))
    }
}

/// Value filled into the input matched by `selector`, first occurrence
pub fn filled(calls: &[Call], selector: &str) -> Option<String> {
    calls.iter().find_map(|c| match c {
        Call::Fill(s, v) if s == selector => Some(v.clone()),
        _ => None,
    })
}
