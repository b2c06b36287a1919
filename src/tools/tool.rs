//! Tool trait, caller context and argument helpers.

use crate::utils::error::{ErrorSeverity, IvitError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Identity of the person talking to the agent, as supplied by the host platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Explicit per-invocation context. The host passes it in; tools never
/// reach for ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolContext {
    pub user: Option<UserIdentity>,
    /// Model that issued the tool call (e.g. `llama3.1:8b`).
    pub model_id: Option<String>,
}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: UserIdentity) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// 日誌用的呼叫者標籤
    pub fn caller_label(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.id.as_deref().or(u.name.as_deref()))
            .unwrap_or("anonymous")
    }

    pub fn caller_email(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.email.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub result: Value,
    pub is_error: bool,
    /// 失敗時的錯誤嚴重度，供 CLI 決定退出碼
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<ErrorSeverity>,
    pub duration: Duration,
}

impl ToolOutput {
    pub fn success(result: Value) -> Self {
        Self {
            result,
            is_error: false,
            severity: None,
            duration: Duration::ZERO,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::success(Value::String(text.into()))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: Value::String(message.into()),
            is_error: true,
            severity: None,
            duration: Duration::ZERO,
        }
    }

    /// Error output carrying the failure's user-facing message and severity.
    pub fn from_error(err: &IvitError) -> Self {
        Self {
            severity: Some(err.severity()),
            ..Self::error(err.user_friendly_message())
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Text handed back to the conversation.
    pub fn as_text(&self) -> String {
        match &self.result {
            Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        }
    }
}

/// Definition of a tool's parameters using JSON Schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters_schema(&self) -> Value;

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolOutput>;

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

fn ensure_object(params: &Value) -> Result<()> {
    match params {
        Value::Object(_) | Value::Null => Ok(()),
        _ => Err(IvitError::invalid_input(
            "arguments",
            "tool arguments must be a JSON object",
        )),
    }
}

/// Present, non-null and not a blank string.
fn supplied<'a>(params: &'a Value, name: &str) -> Result<Option<&'a Value>> {
    ensure_object(params)?;
    Ok(params.get(name).filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }))
}

/// Blank strings count as missing; the value itself is returned untouched.
pub fn require_str<'a>(params: &'a Value, name: &str) -> Result<&'a str> {
    match supplied(params, name)? {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(IvitError::invalid_input(
            name,
            format!("expected a string, got {}", other),
        )),
        None => Err(IvitError::invalid_input(name, "missing required parameter")),
    }
}

pub fn optional_str(params: &Value, name: &str) -> Result<Option<String>> {
    match supplied(params, name)? {
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(other) => Err(IvitError::invalid_input(
            name,
            format!("expected a string, got {}", other),
        )),
        None => Ok(None),
    }
}

/// Accepts a JSON integer or a string holding one.
pub fn optional_int(params: &Value, name: &str) -> Result<Option<i64>> {
    match supplied(params, name)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| IvitError::invalid_input(name, format!("{} is not an integer", n))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| IvitError::invalid_input(name, format!("'{}' is not an integer", s))),
        Some(other) => Err(IvitError::invalid_input(
            name,
            format!("expected an integer, got {}", other),
        )),
        None => Ok(None),
    }
}

/// Accepts a JSON array of integers or its text form, e.g. `"[64, 64, 3]"`,
/// `"(64, 64, 3)"` or `"[64, 64, 3,]"` (one trailing comma).
pub fn optional_int_list(params: &Value, name: &str) -> Result<Option<Vec<i64>>> {
    let parsed = match supplied(params, name)? {
        Some(Value::String(s)) => {
            let text = s.trim();
            let inner = text
                .strip_prefix('(')
                .and_then(|t| t.strip_suffix(')'))
                .or_else(|| text.strip_prefix('[').and_then(|t| t.strip_suffix(']')));
            let text = match inner.map(str::trim_end) {
                Some(inner) => match inner.strip_suffix(',') {
                    Some(rest) if !rest.trim().is_empty() => format!("[{}]", rest),
                    _ => format!("[{}]", inner),
                },
                None => text.to_string(),
            };
            serde_json::from_str::<Value>(&text).map_err(|_| {
                IvitError::invalid_input(name, format!("'{}' is not a list of integers", s))
            })?
        }
        Some(other) => other.clone(),
        None => return Ok(None),
    };

    let items = parsed.as_array().ok_or_else(|| {
        IvitError::invalid_input(name, format!("expected a list of integers, got {}", parsed))
    })?;

    items
        .iter()
        .map(|item| {
            item.as_i64().ok_or_else(|| {
                IvitError::invalid_input(name, format!("{} is not an integer", item))
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_str() {
        let params = json!({"project_name": "fruit_detection"});
        assert_eq!(require_str(&params, "project_name").unwrap(), "fruit_detection");
        assert!(require_str(&json!({}), "project_name").is_err());
        assert!(require_str(&json!({"project_name": "  "}), "project_name").is_err());
        assert!(require_str(&json!({"project_name": 3}), "project_name").is_err());
    }

    #[test]
    fn test_require_str_keeps_surrounding_whitespace() {
        let params = json!({"project_name": " fruit_detection "});
        assert_eq!(require_str(&params, "project_name").unwrap(), " fruit_detection ");
    }

    #[test]
    fn test_optional_int_accepts_numbers_and_numeric_text() {
        assert_eq!(optional_int(&json!({"step": 500}), "step").unwrap(), Some(500));
        assert_eq!(optional_int(&json!({"step": "500"}), "step").unwrap(), Some(500));
        assert_eq!(optional_int(&json!({"step": -2}), "step").unwrap(), Some(-2));
        assert_eq!(optional_int(&json!({"step": ""}), "step").unwrap(), None);
        assert_eq!(optional_int(&json!({"step": null}), "step").unwrap(), None);
        assert_eq!(optional_int(&Value::Null, "step").unwrap(), None);
    }

    #[test]
    fn test_optional_int_rejects_malformed_values() {
        for bad in [json!({"step": "lots"}), json!({"step": 1.5}), json!({"step": [1]})] {
            match optional_int(&bad, "step") {
                Err(IvitError::InvalidInputError { field, .. }) => assert_eq!(field, "step"),
                other => panic!("expected invalid input, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_optional_int_list_parses_literals() {
        let expected = Some(vec![64, 64, 3]);
        assert_eq!(
            optional_int_list(&json!({"input_shape": [64, 64, 3]}), "input_shape").unwrap(),
            expected
        );
        assert_eq!(
            optional_int_list(&json!({"input_shape": "[64, 64, 3]"}), "input_shape").unwrap(),
            expected
        );
        assert_eq!(
            optional_int_list(&json!({"input_shape": "(64, 64, 3)"}), "input_shape").unwrap(),
            expected
        );
        assert!(optional_int_list(&json!({"input_shape": "64x64x3"}), "input_shape").is_err());
        assert!(optional_int_list(&json!({"input_shape": "[64,, 3]"}), "input_shape").is_err());
        assert!(optional_int_list(&json!({"input_shape": "[,]"}), "input_shape").is_err());
        assert!(optional_int_list(&json!({"input_shape": "[64, \"a\"]"}), "input_shape").is_err());
    }

    #[test]
    fn test_optional_int_list_allows_one_trailing_comma() {
        let expected = Some(vec![64, 64, 3]);
        for literal in ["[64, 64, 3,]", "(64, 64, 3,)", "( 64, 64, 3 , )"] {
            assert_eq!(
                optional_int_list(&json!({ "input_shape": literal }), "input_shape").unwrap(),
                expected,
                "{}",
                literal
            );
        }
        assert!(optional_int_list(&json!({"input_shape": "[64, 64, 3,,]"}), "input_shape").is_err());
    }

    #[test]
    fn test_non_object_arguments_are_rejected() {
        assert!(optional_str(&json!(["fruit"]), "model").is_err());
    }

    #[test]
    fn test_caller_label() {
        assert_eq!(ToolContext::new().caller_label(), "anonymous");

        let ctx = ToolContext::new().with_user(UserIdentity {
            id: None,
            name: Some("Jay".to_string()),
            email: None,
        });
        assert_eq!(ctx.caller_label(), "Jay");
        assert_eq!(ctx.caller_email(), None);

        let ctx = ToolContext::new().with_user(UserIdentity {
            id: Some("u-1".to_string()),
            name: None,
            email: Some("jay@example.com".to_string()),
        });
        assert_eq!(ctx.caller_label(), "u-1");
        assert_eq!(ctx.caller_email(), Some("jay@example.com"));
    }

    #[test]
    fn test_output_text() {
        assert_eq!(ToolOutput::text("done").as_text(), "done");
        assert!(ToolOutput::success(json!({"a": 1})).as_text().contains("\"a\": 1"));
        assert!(ToolOutput::error("boom").is_error);

        let output = ToolOutput::from_error(&IvitError::HttpStatusError { status: 503 });
        assert!(output.is_error);
        assert_eq!(output.as_text(), "HTTP Error: 503");
        assert_eq!(output.severity, Some(ErrorSeverity::Medium));
    }
}
