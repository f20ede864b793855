//! Policy document model.
//!
//! Documents are decoded from `serde_json::Value` rather than through a strict
//! `Deserialize` derive: unexpected shapes inside a parsed document are
//! coerced or defaulted, never rejected. Only a top-level value that is not a
//! JSON object is an error.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Sid used for statements that do not carry one.
pub const DEFAULT_SID: &str = "unnamed";

/// Errors that can occur while decoding a policy document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Policy document must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Effect of a statement.
///
/// Values other than `Allow` and `Deny` are kept verbatim in their own bucket
/// instead of being rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Effect {
    #[default]
    Allow,
    Deny,
    Other(String),
}

impl Effect {
    pub fn as_str(&self) -> &str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
            Effect::Other(value) => value,
        }
    }
}

impl From<&str> for Effect {
    fn from(value: &str) -> Self {
        match value {
            "Allow" => Effect::Allow,
            "Deny" => Effect::Deny,
            other => Effect::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Effects order by their string form so that sorted output does not depend on
// variant declaration order.
impl Ord for Effect {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Effect {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Effect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single access-control rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub effect: Effect,

    /// Literal action strings; duplicates collapse.
    pub actions: BTreeSet<String>,

    pub sid: Option<String>,
}

impl Statement {
    pub fn new<I, S>(effect: Effect, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            effect,
            actions: actions.into_iter().map(Into::into).collect(),
            sid: None,
        }
    }

    /// Creates an `Allow` statement for the given actions.
    pub fn allow<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Effect::Allow, actions)
    }

    /// Creates a `Deny` statement for the given actions.
    pub fn deny<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Effect::Deny, actions)
    }

    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    /// Returns the statement's Sid, or [`DEFAULT_SID`] when absent.
    pub fn sid_or_default(&self) -> &str {
        self.sid.as_deref().unwrap_or(DEFAULT_SID)
    }

    /// Decodes one entry of a `Statement` array.
    ///
    /// Returns `None` for entries that are not JSON objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        let effect = object
            .get("Effect")
            .and_then(Value::as_str)
            .map(Effect::from)
            .unwrap_or_default();

        let sid = object
            .get("Sid")
            .and_then(Value::as_str)
            .map(|s| s.to_string());

        Some(Self {
            effect,
            actions: decode_actions(object),
            sid,
        })
    }
}

/// Reads the `Action` field, accepting either a single string or a list.
fn decode_actions(object: &Map<String, Value>) -> BTreeSet<String> {
    match object.get("Action") {
        Some(Value::String(action)) => BTreeSet::from([action.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(|s| s.to_string()))
            .collect(),
        _ => BTreeSet::new(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// An ordered sequence of statements loaded from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyDocument {
    pub statements: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Parses a policy document from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(&value)
    }

    /// Decodes a policy document from an already parsed JSON value.
    ///
    /// `Statement` may be an array of statements or a single statement object.
    /// A missing or otherwise-typed `Statement` yields an empty document.
    pub fn from_value(value: &Value) -> Result<Self, DocumentError> {
        let object = value
            .as_object()
            .ok_or_else(|| DocumentError::NotAnObject(json_type_name(value)))?;

        let statements = match object.get("Statement") {
            Some(Value::Array(items)) => items.iter().filter_map(Statement::from_value).collect(),
            Some(single @ Value::Object(_)) => Statement::from_value(single).into_iter().collect(),
            _ => Vec::new(),
        };

        Ok(Self { statements })
    }

    /// Total number of actions across all statements, counting repeats.
    pub fn action_count(&self) -> usize {
        self.statements.iter().map(|s| s.actions.len()).sum()
    }
}
