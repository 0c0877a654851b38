//! Terminal output for the simulator and the graph check, styled with
//! `console`.

use console::Style;

use crate::orchestrator::Reply;
use crate::pagination::CHARACTERS_PER_PAGE;
use crate::registration::RenderedNode;

pub struct Terminal {
    green: Style,
    red: Style,
    yellow: Style,
    cyan: Style,
    dim: Style,
}

impl Default for Terminal {
    fn default() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            cyan: Style::new().cyan(),
            dim: Style::new().dim(),
        }
    }
}

impl Terminal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn banner(&self, from: &str) {
        println!(
            "{} simulating USSD sessions from {from}",
            self.cyan.apply_to("☎")
        );
        println!(
            "{}",
            self.dim
                .apply_to("  empty line: new session   :close: close session   :quit: exit")
        );
    }

    /// Show a reply the way a handset would, followed by its length.
    pub fn reply(&self, reply: &Reply) {
        println!();
        for line in reply.content.lines() {
            println!("  {line}");
        }
        let length = reply.content.chars().count();
        let meta = format!("  [{length}/{CHARACTERS_PER_PAGE} chars]");
        if reply.continue_session {
            println!("{}", self.dim.apply_to(meta));
        } else {
            println!(
                "{} {}",
                self.dim.apply_to(meta),
                self.yellow.apply_to("session ended")
            );
        }
    }

    pub fn closed(&self) {
        println!("{}", self.yellow.apply_to("  session closed"));
    }

    pub fn turn_failed(&self, error: &dyn std::fmt::Display) {
        println!(
            "  {} no reply, turn failed: {error}",
            self.red.apply_to("✗")
        );
    }

    /// One line per node. Returns whether every node fits.
    pub fn render_report(&self, nodes: &[RenderedNode]) -> bool {
        let mut all_fit = true;
        for node in nodes {
            if node.fits() {
                println!(
                    "  {} {:<32} {:>3} chars",
                    self.green.apply_to("✓"),
                    node.id,
                    node.chars()
                );
            } else {
                all_fit = false;
                let reason = if node.truncated { "prompt truncated" } else { "too long" };
                println!(
                    "  {} {:<32} {:>3} chars ({reason})",
                    self.red.apply_to("✗"),
                    node.id,
                    node.chars()
                );
            }
        }
        println!();
        if all_fit {
            println!(
                "  {} {} nodes fit {CHARACTERS_PER_PAGE} characters",
                self.green.apply_to("✓"),
                nodes.len()
            );
        } else {
            println!(
                "  {} some nodes do not fit {CHARACTERS_PER_PAGE} characters",
                self.red.apply_to("✗")
            );
        }
        all_fit
    }
}
