use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single strategy invocation as understood by the engine.
///
/// Only `strategy_name` and `strategy_path` are interpreted on this side of
/// the wire; anything else the caller attaches is carried through untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StrategyRequest {
    pub strategy_name: String,
    #[serde(default)]
    pub strategy_path: Option<String>,
    #[serde(default)]
    pub param_config: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StrategyRequest {
    pub fn new(strategy_name: impl Into<String>) -> Self {
        Self {
            strategy_name: strategy_name.into(),
            strategy_path: None,
            param_config: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn with_path(mut self, strategy_path: impl Into<String>) -> Self {
        self.strategy_path = Some(strategy_path.into());
        self
    }

    pub fn with_params(mut self, param_config: Map<String, Value>) -> Self {
        self.param_config = param_config;
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "command")]
pub enum ClientCommand {
    ExecuteStrategy { strategy: StrategyRequest },
}

impl ClientCommand {
    pub fn execute(strategy: StrategyRequest) -> Self {
        ClientCommand::ExecuteStrategy { strategy }
    }

    pub fn strategy(&self) -> &StrategyRequest {
        match self {
            ClientCommand::ExecuteStrategy { strategy } => strategy,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Busy,
    InvalidCommand,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ServerMessage {
    Accepted { strategy_name: String },
    Error { msg: String, code: ErrorCode },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn execute_strategy_envelope_shape() {
        let req = StrategyRequest::new("LoadDataBundleData").with_path("data_bundle/load");
        let value = serde_json::to_value(ClientCommand::execute(req)).unwrap();
        assert_eq!(
            value,
            json!({
                "command": "execute_strategy",
                "strategy": {
                    "strategy_name": "LoadDataBundleData",
                    "strategy_path": "data_bundle/load",
                    "param_config": {}
                }
            })
        );
    }

    #[test]
    fn unknown_request_fields_are_preserved() {
        let raw = json!({
            "strategy_name": "SplitBundleDate",
            "strategy_path": null,
            "param_config": { "split_date": "2020-01-01" },
            "nested_requests": []
        });
        let req: StrategyRequest = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(req.strategy_path, None);
        assert!(req.extra.contains_key("nested_requests"));
        assert_eq!(serde_json::to_value(&req).unwrap(), raw);
    }

    #[test]
    fn engine_error_codes() {
        let reply: ServerMessage = serde_json::from_value(json!({
            "type": "error",
            "msg": "server busy",
            "code": "busy"
        }))
        .unwrap();
        assert_eq!(
            reply,
            ServerMessage::Error {
                msg: "server busy".to_string(),
                code: ErrorCode::Busy
            }
        );
        assert!(serde_json::from_value::<ErrorCode>(json!("internal_error")).is_err());
    }
}
