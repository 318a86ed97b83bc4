//! Waybar custom-module output: one JSON object per line on stdout.

use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaybarStatus {
    pub text: String,
    pub tooltip: Option<String>,
    pub class: &'static str,
    pub percentage: u8,
}

impl WaybarStatus {
    pub fn new(class: &'static str, text: impl Into<String>, tooltip: Option<String>) -> Self {
        Self {
            text: text.into(),
            tooltip,
            class,
            percentage: 0,
        }
    }
}

/// Write one status line. An error means the reader went away.
pub fn emit<W: Write>(out: &mut W, status: &WaybarStatus) -> std::io::Result<()> {
    let line = serde_json::to_string(status).map_err(std::io::Error::other)?;
    writeln!(out, "{}", line)?;
    out.flush()
}

/// Escape the characters Pango markup cares about.
pub fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
