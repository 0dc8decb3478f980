//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Messages and limits used by [`crate::engine::ScriptEngine`].
///
/// Every field has a default, so a configuration file only needs to name
/// what it changes:
///
/// ```json
/// { "not_understood": "Come again?" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Said whenever no response alternative matches a reply at all.
    pub not_understood: String,
    /// Question asked for a missing field; `{frame}` and `{field}` are
    /// replaced with the frame and field names.
    pub clarify: String,
    /// Said once a clarifying answer binds its field; `{value}` is replaced
    /// with the bound word.
    pub acknowledge: String,
    /// Maximum number of hypernym links followed from a candidate sense.
    pub max_hypernym_depth: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            not_understood: "Sorry, I did not understand that.".into(),
            clarify: "Could you tell me the {field} of the {frame}?".into(),
            acknowledge: "Got it: {value}.".into(),
            max_hypernym_depth: None,
        }
    }
}

impl EngineConfig {
    pub fn clarify_question(&self, frame: &str, field: &str) -> String {
        self.clarify
            .replace("{frame}", frame)
            .replace("{field}", field)
    }

    pub fn acknowledgement(&self, value: &str) -> String {
        self.acknowledge.replace("{value}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn templates_are_filled() {
        let config = EngineConfig::default();
        assert_eq!(
            config.clarify_question("pet", "name"),
            "Could you tell me the name of the pet?"
        );
        assert_eq!(config.acknowledgement("Rex"), "Got it: Rex.");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "not_understood": "Come again?", "max_hypernym_depth": 8 }"#)
                .unwrap();
        assert_eq!(config.not_understood, "Come again?");
        assert_eq!(config.max_hypernym_depth, Some(8));
        assert_eq!(config.clarify, EngineConfig::default().clarify);
    }
}
