//! Output mode handling for the command layer.

use serde::Serialize;

/// Output control settings from CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputControls {
    /// Emit machine-readable JSON instead of text tables.
    pub json: bool,
    /// Single-line JSON (implies `json`).
    pub compact: bool,
}

impl OutputControls {
    pub fn is_json(&self) -> bool {
        self.json || self.compact
    }

    /// Serialize data according to the selected JSON style.
    pub fn emit<T: Serialize>(&self, data: &T) -> String {
        let result = if self.compact {
            serde_json::to_string(data)
        } else {
            serde_json::to_string_pretty(data)
        };
        result.unwrap_or_else(|_| "{}".to_string())
    }

    /// Print data to stdout as JSON.
    pub fn print<T: Serialize>(&self, data: &T) {
        println!("{}", self.emit(data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: &'static str,
        count: usize,
    }

    #[test]
    fn test_compact_emits_single_line() {
        let out = OutputControls {
            json: false,
            compact: true,
        };
        let s = out.emit(&Sample { name: "a", count: 1 });
        assert_eq!(s, r#"{"name":"a","count":1}"#);
        assert!(out.is_json());
    }

    #[test]
    fn test_pretty_emits_multiline() {
        let out = OutputControls {
            json: true,
            compact: false,
        };
        assert!(out.emit(&Sample { name: "a", count: 1 }).contains('\n'));
    }
}
