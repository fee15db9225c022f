//! Trigger actions: the literal writes that turn geometry overlap (or a Load
//! being used) into a field change on another entity.
//!
//! An action names its receiver by scene uid and the receiving field by name,
//! and carries a literal payload. Actions serialize to the host's trigger JSON
//! shape, where payloads are strings:
//!
//! ```json
//! { "receiverAtom": "Injector#1", "receiver": "Injector",
//!   "receiverTargetName": "run", "boolValue": "true" }
//! ```

use serde::{Deserialize, Serialize};

/// Literal written into the receiving field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerValue {
    Bool(bool),
    Float(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TriggerActionJson", into = "TriggerActionJson")]
pub struct TriggerAction {
    /// Scene uid of the receiving entity.
    pub receiver_atom: String,
    /// Name of the receiving script (informational).
    pub receiver: String,
    /// Name of the receiving field.
    pub receiver_target: String,
    pub value: TriggerValue,
}

impl TriggerAction {
    pub fn new(
        receiver_atom: impl Into<String>,
        receiver: impl Into<String>,
        receiver_target: impl Into<String>,
        value: TriggerValue,
    ) -> Self {
        Self {
            receiver_atom: receiver_atom.into(),
            receiver: receiver.into(),
            receiver_target: receiver_target.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TriggerActionJson {
    receiver_atom: String,
    #[serde(default)]
    receiver: String,
    receiver_target_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bool_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    float_value: Option<String>,
}

impl From<TriggerAction> for TriggerActionJson {
    fn from(action: TriggerAction) -> Self {
        let (bool_value, float_value) = match action.value {
            TriggerValue::Bool(b) => (Some(b.to_string()), None),
            TriggerValue::Float(f) => (None, Some(f.to_string())),
        };
        Self {
            receiver_atom: action.receiver_atom,
            receiver: action.receiver,
            receiver_target_name: action.receiver_target,
            bool_value,
            float_value,
        }
    }
}

impl TryFrom<TriggerActionJson> for TriggerAction {
    type Error = String;

    fn try_from(json: TriggerActionJson) -> Result<Self, Self::Error> {
        let value = match (json.bool_value, json.float_value) {
            (Some(b), _) => TriggerValue::Bool(
                b.parse::<bool>()
                    .map_err(|e| format!("invalid boolValue '{}': {}", b, e))?,
            ),
            (None, Some(f)) => TriggerValue::Float(
                f.parse::<f32>()
                    .map_err(|e| format!("invalid floatValue '{}': {}", f, e))?,
            ),
            (None, None) => return Err("trigger action without a value".to_string()),
        };
        Ok(Self {
            receiver_atom: json.receiver_atom,
            receiver: json.receiver,
            receiver_target: json.receiver_target_name,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_action_uses_string_literal() {
        let action = TriggerAction::new("Injector#1", "Injector", "run", TriggerValue::Bool(true));
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["receiverAtom"], "Injector#1");
        assert_eq!(json["receiverTargetName"], "run");
        assert_eq!(json["boolValue"], "true");
        assert!(json.get("floatValue").is_none());
    }

    #[test]
    fn test_slot_index_literal() {
        let action = TriggerAction::new("Case#1", "Case", "collision", TriggerValue::Float(3.0));
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["floatValue"], "3");
    }

    #[test]
    fn test_parse_host_json() {
        let json = r#"{"receiverAtom":"Case#1","receiver":"Case","receiverTargetName":"collision","floatValue":"0"}"#;
        let action: TriggerAction = serde_json::from_str(json).unwrap();
        assert_eq!(action.value, TriggerValue::Float(0.0));
        assert_eq!(action.receiver_target, "collision");
    }

    #[test]
    fn test_parse_rejects_bad_literal() {
        let json = r#"{"receiverAtom":"X","receiverTargetName":"run","boolValue":"yes"}"#;
        assert!(serde_json::from_str::<TriggerAction>(json).is_err());
    }
}
