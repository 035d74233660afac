//! Transaction listener configuration

use serde::Deserialize;

/// Behavior of the background transaction-update worker
#[derive(Debug, Clone, Deserialize)]
pub struct ListenerConfig {
    /// Acknowledge ("finish") each verified update as it is delivered.
    /// Disable to defer acknowledgment to the update handler.
    #[serde(default = "default_acknowledge")]
    pub acknowledge_on_delivery: bool,
}

fn default_acknowledge() -> bool {
    true
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            acknowledge_on_delivery: default_acknowledge(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acknowledges_by_default() {
        assert!(ListenerConfig::default().acknowledge_on_delivery);
    }

    #[test]
    fn deserializes_explicit_defer() {
        let config: ListenerConfig =
            serde_json::from_str(r#"{"acknowledge_on_delivery": false}"#).unwrap();
        assert!(!config.acknowledge_on_delivery);
    }
}
