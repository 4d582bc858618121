//! Interactive choice for the `q` selectors.

mod dialog;
mod picker;

pub use dialog::{DialogMenu, Flavor};
pub use picker::Picker;

use std::io::IsTerminal;

use anyhow::Result;
use tracing::debug;

use crate::config::MenuPreference;

/// Value of the entry that asks for something new
pub const NEW: &str = "NEW";

/// One entry in a menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Returned when picked
    pub value: String,
    /// Shown next to the value, may be empty
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Presents a list and returns the picked value, `None` when cancelled
pub trait Chooser {
    fn choose(&self, prompt: &str, choices: &[Choice]) -> Result<Option<String>>;
}

/// Find a usable menu for the given preference
pub fn detect(preference: MenuPreference) -> Option<Box<dyn Chooser>> {
    let chooser: Option<Box<dyn Chooser>> = match preference {
        MenuPreference::Dialog => external(Flavor::Dialog),
        MenuPreference::Whiptail => external(Flavor::Whiptail),
        MenuPreference::Builtin => builtin(),
        MenuPreference::Auto => external(Flavor::Dialog)
            .or_else(|| external(Flavor::Whiptail))
            .or_else(builtin),
    };
    if chooser.is_none() {
        debug!(?preference, "no interactive menu available");
    }
    chooser
}

fn external(flavor: Flavor) -> Option<Box<dyn Chooser>> {
    let program = which::which(flavor.program()).ok()?;
    debug!(program = %program.display(), "using external menu");
    Some(Box::new(DialogMenu::new(program, flavor)))
}

fn builtin() -> Option<Box<dyn Chooser>> {
    if std::io::stdin().is_terminal() && std::io::stdout().is_terminal() {
        Some(Box::new(Picker::new()))
    } else {
        None
    }
}
