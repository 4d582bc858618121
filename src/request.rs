//! Turns the zero to two positional arguments into a pair of selectors.
//!
//! The same letters mean different things depending on the slot they land
//! in, so everything downstream works on [`Selector`] rather than raw strings.

use std::fmt;

use tracing::warn;

use crate::error::LaunchError;

/// One of the single-letter codes accepted in either slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// `n`: make a new one
    New,
    /// `d`: take the default
    Default,
    /// `q`: ask interactively
    Query,
}

impl Code {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'n' => Some(Code::New),
            'd' => Some(Code::Default),
            'q' => Some(Code::Query),
            _ => None,
        }
    }

    fn from_arg(arg: &str) -> Option<Self> {
        let mut chars = arg.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Code::from_char(c),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Code::New => 'n',
            Code::Default => 'd',
            Code::Query => 'q',
        }
    }
}

/// How the user expressed a server or session choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Char(Code),
    /// Explicit server slot, always below 100
    Number(u8),
    Name(String),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Char(code) => write!(f, "{}", code.as_char()),
            Selector::Number(n) => write!(f, "#{:02}", n),
            Selector::Name(name) => write!(f, "'{}'", name),
        }
    }
}

/// Normalized request: which server, which session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub server: Selector,
    pub session: Selector,
}

impl Request {
    fn new(server: Selector, session: Selector) -> Self {
        Self { server, session }
    }
}

/// Parse the positional arguments.
///
/// Help flags never reach this point; clap answers them first.
pub fn normalize(args: &[String]) -> Result<Request, LaunchError> {
    if args.len() > 2 {
        warn!(ignored = ?&args[2..], "ignoring extra arguments");
    }

    match args {
        [] => Ok(Request::new(
            Selector::Char(Code::Query),
            Selector::Char(Code::Default),
        )),
        [arg] => Ok(normalize_single(arg)),
        [server, session, ..] => Ok(Request::new(
            parse_server(server)?,
            parse_session(session),
        )),
    }
}

fn normalize_single(arg: &str) -> Request {
    if let Some(code) = Code::from_arg(arg) {
        return Request::new(Selector::Char(Code::Default), Selector::Char(code));
    }

    let mut chars = arg.chars();
    if let (Some(a), Some(b), None) = (chars.next(), chars.next(), chars.next()) {
        if let (Some(server), Some(session)) = (Code::from_char(a), Code::from_char(b)) {
            return Request::new(Selector::Char(server), Selector::Char(session));
        }
    }

    Request::new(
        Selector::Char(Code::Default),
        Selector::Name(arg.to_string()),
    )
}

fn parse_server(arg: &str) -> Result<Selector, LaunchError> {
    if let Some(code) = Code::from_arg(arg) {
        return Ok(Selector::Char(code));
    }
    if let Some(index) = parse_index(arg) {
        return Ok(Selector::Number(index));
    }
    Err(LaunchError::Usage(format!(
        "invalid server '{}': expected n, d, q or a number from 0 to 99",
        arg
    )))
}

fn parse_session(arg: &str) -> Selector {
    match Code::from_arg(arg) {
        Some(code) => Selector::Char(code),
        None => Selector::Name(arg.to_string()),
    }
}

/// One or two ASCII digits
fn parse_index(arg: &str) -> Option<u8> {
    if arg.is_empty() || arg.len() > 2 || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    arg.parse().ok()
}
