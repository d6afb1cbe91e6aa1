//! Declarative YAML suite: browser steps and the table of scenario cases

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{E2eError, E2eResult};
use crate::site;

/// Built-in suite covering the Automation Exercise scenarios
const BUILTIN_SUITE: &str = include_str!("../specs/automation_exercise.yaml");

/// A single browser step. Serialized as-is onto the driver protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Navigate to a URL (absolute, or relative to the base URL)
    Navigate {
        url: String,
    },

    /// Click an element
    Click {
        selector: String,
    },

    /// Fill an input field
    Fill {
        selector: String,
        value: String,
    },

    /// Check a checkbox
    Check {
        selector: String,
    },

    /// Select an option from a dropdown by value or label
    Select {
        selector: String,
        value: String,
    },

    /// Attach a local file to a file input
    Upload {
        selector: String,
        path: PathBuf,
    },

    /// Accept the next dialog the page opens, once
    AcceptDialog,

    /// Assert something about an element
    Assert {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        visible: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_contains: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<usize>,
    },

    /// Assert the page title
    AssertTitle {
        title: String,
    },

    /// Collect the text content of every matching element
    TextContents {
        selector: String,
    },

    /// Take a screenshot
    Screenshot {
        path: PathBuf,
        #[serde(default)]
        full_page: bool,
    },

    /// Log a message (for debugging)
    Log {
        message: String,
    },
}

impl TestStep {
    /// Short name used in logs and error messages
    pub fn describe(&self) -> String {
        match self {
            TestStep::Navigate { url } => format!("navigate:{}", url),
            TestStep::Click { selector } => format!("click:{}", selector),
            TestStep::Fill { selector, .. } => format!("fill:{}", selector),
            TestStep::Check { selector } => format!("check:{}", selector),
            TestStep::Select { selector, value } => format!("select:{}={}", selector, value),
            TestStep::Upload { selector, .. } => format!("upload:{}", selector),
            TestStep::AcceptDialog => "accept_dialog".to_string(),
            TestStep::Assert { selector, .. } => format!("assert:{}", selector),
            TestStep::AssertTitle { title } => format!("assert_title:{}", title),
            TestStep::TextContents { selector } => format!("text_contents:{}", selector),
            TestStep::Screenshot { path, .. } => format!("screenshot:{}", path.display()),
            TestStep::Log { message } => {
                let cut = message
                    .char_indices()
                    .nth(30)
                    .map(|(i, _)| i)
                    .unwrap_or(message.len());
                format!("log:{}", &message[..cut])
            }
        }
    }
}

fn default_email_prefix() -> String {
    "wrong.john.doe".to_string()
}

fn default_password_length() -> usize {
    10
}

fn default_login_error() -> String {
    site::LOGIN_ERROR.to_string()
}

fn default_email_exists() -> String {
    site::EMAIL_EXISTS.to_string()
}

/// One parameterised scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum Scenario {
    /// Register a fresh account, confirm the login banner, delete it
    RegisterUser,

    /// Register, log out, log back in with the same credentials, delete
    LoginValid,

    /// Log in with a random unknown email and password
    LoginInvalid {
        #[serde(default = "default_email_prefix")]
        email_prefix: String,
        #[serde(default = "default_password_length")]
        password_length: usize,
        #[serde(default = "default_login_error")]
        expected_error: String,
    },

    /// Register, log out, log in again, then log out to the login page
    Logout,

    /// Register, log out, then sign up again with the same email
    RegisterExistingEmail {
        #[serde(default = "default_email_exists")]
        expected_error: String,
    },

    /// Submit the contact form, optionally with an attachment
    ContactUs {
        subject: String,
        message: String,
        #[serde(default)]
        attachment: Option<PathBuf>,
    },

    /// Search the product catalogue and check every hit matches
    SearchProduct {
        query: String,
    },

    /// Raw declarative steps
    Steps {
        steps: Vec<TestStep>,
    },
}

/// A named, tagged scenario case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSpec {
    /// Unique name for this case
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(flatten)]
    pub scenario: Scenario,
}

/// A table of cases parsed from YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suite {
    pub cases: Vec<CaseSpec>,
}

impl Suite {
    /// Parse a suite from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let suite: Suite = serde_yaml::from_str(yaml)?;
        suite.validate()?;
        Ok(suite)
    }

    /// Parse a suite from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load and merge every suite in a directory
    pub fn load_all(dir: &Path) -> E2eResult<Self> {
        let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        let mut cases = Vec::new();
        for path in paths {
            cases.extend(Self::from_file(&path)?.cases);
        }

        let suite = Suite { cases };
        suite.validate()?;
        Ok(suite)
    }

    /// The suite compiled into this crate
    pub fn builtin() -> E2eResult<Self> {
        Self::from_yaml(BUILTIN_SUITE)
    }

    /// Cases carrying a tag
    pub fn filter_by_tag(&self, tag: &str) -> Suite {
        Suite {
            cases: self
                .cases
                .iter()
                .filter(|c| c.tags.iter().any(|t| t == tag))
                .cloned()
                .collect(),
        }
    }

    /// The case with the given name
    pub fn find(&self, name: &str) -> Option<&CaseSpec> {
        self.cases.iter().find(|c| c.name == name)
    }

    fn validate(&self) -> E2eResult<()> {
        let mut seen = std::collections::HashSet::new();
        for case in &self.cases {
            if !seen.insert(case.name.as_str()) {
                return Err(E2eError::SpecParse(format!("duplicate case name: {}", case.name)));
            }
        }
        Ok(())
    }
}
