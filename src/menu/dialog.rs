use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use super::{Choice, Chooser};

const TITLE: &str = "tmux-hop";
const MAX_LIST_HEIGHT: usize = 15;
const MIN_WIDTH: usize = 40;
const MAX_WIDTH: usize = 76;

/// dialog and whiptail share the `--menu` interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Dialog,
    Whiptail,
}

impl Flavor {
    pub fn program(self) -> &'static str {
        match self {
            Flavor::Dialog => "dialog",
            Flavor::Whiptail => "whiptail",
        }
    }
}

/// Menu driven by an external dialog/whiptail binary
pub struct DialogMenu {
    program: PathBuf,
    flavor: Flavor,
}

impl DialogMenu {
    pub fn new(program: PathBuf, flavor: Flavor) -> Self {
        Self { program, flavor }
    }

    fn menu_args(&self, prompt: &str, choices: &[Choice]) -> Vec<String> {
        let list_height = choices.len().clamp(1, MAX_LIST_HEIGHT);
        let widest = choices
            .iter()
            .map(|c| c.value.chars().count() + c.label.chars().count())
            .chain(std::iter::once(prompt.chars().count()))
            .max()
            .unwrap_or(0);
        let width = (widest + 12).clamp(MIN_WIDTH, MAX_WIDTH);

        let mut args = Vec::new();
        if self.flavor == Flavor::Dialog {
            args.push("--clear".to_string());
        }
        args.extend([
            "--title".to_string(),
            TITLE.to_string(),
            "--menu".to_string(),
            prompt.to_string(),
            (list_height + 8).to_string(),
            width.to_string(),
            list_height.to_string(),
        ]);
        for choice in choices {
            args.push(choice.value.clone());
            args.push(choice.label.clone());
        }
        args
    }
}

impl Chooser for DialogMenu {
    fn choose(&self, prompt: &str, choices: &[Choice]) -> Result<Option<String>> {
        // The menu draws on the terminal and reports the pick on stderr
        let output = Command::new(&self.program)
            .args(self.menu_args(prompt, choices))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("Failed to run {}", self.program.display()))?;

        if !output.status.success() {
            return Ok(None);
        }

        let picked = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Ok((!picked.is_empty()).then_some(picked))
    }
}
