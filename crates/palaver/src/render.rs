// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message renderer for the chat panel.
//!
//! Each turn prints as a coloured role label followed by its content, one
//! indented line per content line.

use colored::{ColoredString, Colorize};
use palaver_core::{PalaverError, Role, Turn};

const INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    show_timestamps: bool,
}

impl Renderer {
    pub fn new(show_timestamps: bool) -> Self {
        Self { show_timestamps }
    }

    pub fn turn(&self, turn: &Turn) -> String {
        let mut out = label(turn.role()).to_string();
        if self.show_timestamps {
            let stamp = turn.created_at().format("%H:%M:%S").to_string();
            out.push_str(&format!(" {}", stamp.dimmed()));
        }
        for line in turn.content().lines() {
            out.push('\n');
            out.push_str(INDENT);
            out.push_str(line);
        }
        out
    }

    /// All turns separated by blank lines, or a placeholder for an empty chat.
    pub fn transcript(&self, turns: &[Turn]) -> String {
        if turns.is_empty() {
            return format!("{}", "(no messages yet)".dimmed());
        }
        turns
            .iter()
            .map(|t| self.turn(t))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn error(&self, err: &PalaverError) -> String {
        format!("{}: {}", "error".red(), err.user_message())
    }

    pub fn hint(&self, text: &str) -> String {
        format!("{}", text.dimmed())
    }
}

fn label(role: Role) -> ColoredString {
    let text = role.to_string();
    match role {
        Role::User => text.cyan().bold(),
        Role::Assistant => text.green().bold(),
        Role::System => text.yellow().bold(),
    }
}
