//! Config serialization to TOML
//!
//! Single source of truth for config file format: `config --init` writes the
//! default rendering and `config --show` prints the effective one.

use super::{Config, PaneConfig};

/// TOML basic string with escaping
fn quote(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

impl Config {
    /// Serialize [[panes]] entries, or an example block when none are configured
    pub(super) fn panes_to_toml(&self) -> String {
        if self.panes.is_empty() {
            return r#"
# With no panes configured the built-in demo runs.
#
# [[panes]]
# name = "services"
# side = "left"                 # left column (1/3 width) or right column (2/3)
# kind = "list"                 # list (selectable rows) or text
# command = "systemctl list-units --type=service --plain --no-legend | cut -d' ' -f1"
# interval_ms = 1000            # re-run every second
#
# [[panes.bindings]]
# target = "detail"             # pane that shows information about the selection
# command = "systemctl status {}"   # {} is the selected row
# ttl_ms = 5000                 # cache each row's output this long
# follow = "journalctl -fu {}"  # press f to stream this into the target instead
#
# [[panes]]
# name = "detail"
# side = "right"
# kind = "text"
"#
            .to_string();
        }

        let mut output = String::new();
        for pane in &self.panes {
            output.push('\n');
            output.push_str(&pane_to_toml(pane));
        }
        output
    }

    pub fn to_toml(&self) -> String {
        format!(
            r#"# paneboard configuration

# Longest wait for a key press before the screen is refreshed (milliseconds)
tick_ms = {tick_ms}

# Logging configuration (RUST_LOG env var overrides the level)
[logging]
level = {log_level}
# Show captured logs in a pane on the right
pane = {log_pane}
# File logging (JSON lines, in addition to the in-memory buffer)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = {log_file_prefix}
{panes}"#,
            tick_ms = self.tick.as_millis(),
            log_level = quote(&self.logging.level),
            log_pane = self.logging.pane,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = quote(&self.logging.file_dir.display().to_string()),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = quote(&self.logging.file_prefix),
            panes = self.panes_to_toml(),
        )
    }
}

fn pane_to_toml(pane: &PaneConfig) -> String {
    let mut output = String::from("[[panes]]\n");
    output.push_str(&format!("name = {}\n", quote(&pane.name)));
    output.push_str(&format!("side = \"{}\"\n", pane.side.as_str()));
    output.push_str(&format!("kind = \"{}\"\n", pane.kind.as_str()));
    if let Some(command) = &pane.command {
        output.push_str(&format!("command = {}\n", quote(command)));
    }
    if let Some(interval_ms) = pane.interval_ms {
        output.push_str(&format!("interval_ms = {}\n", interval_ms));
    }
    if pane.tail {
        output.push_str("tail = true\n");
    }

    for binding in &pane.bindings {
        output.push_str("\n[[panes.bindings]]\n");
        output.push_str(&format!("target = {}\n", quote(&binding.target)));
        if let Some(command) = &binding.command {
            output.push_str(&format!("command = {}\n", quote(command)));
        }
        if let Some(ttl_ms) = binding.ttl_ms {
            output.push_str(&format!("ttl_ms = {}\n", ttl_ms));
        }
        if let Some(follow) = &binding.follow {
            output.push_str(&format!("follow = {}\n", quote(follow)));
        }
    }
    output
}
