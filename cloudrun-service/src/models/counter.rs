//! The persisted visit counter.

use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

/// Well-known key of the single counter record.
pub const COUNTER_ID: i32 = 1;

/// Counter document. There is at most one, stored under [`COUNTER_ID`].
///
/// A missing document means a count of zero; clearing deletes the document
/// rather than resetting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: i32,

    pub count: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

/// What a POST to the counter endpoint asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterAction {
    Increment,
    Clear,
}

impl CounterAction {
    /// Wire name of the action; unknown names yield `None`.
    pub fn from_wire(action: &str) -> Option<Self> {
        match action {
            "inc" => Some(CounterAction::Increment),
            "clear" => Some(CounterAction::Clear),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CounterAction::Increment => "inc",
            CounterAction::Clear => "clear",
        }
    }
}
