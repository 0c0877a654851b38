mod locks;
mod store;

pub use locks::AddressLocks;
pub use store::{InMemorySessionStore, JsonFileSessionStore, SessionStore};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::Scalar;

/// Names of the per-user counters kept in [`UserSession::counters`].
pub mod counters {
    pub const USSD_SESSIONS: &str = "ussd_sessions";
    pub const POSSIBLE_TIMEOUTS: &str = "possible_timeouts";
    pub const REGISTERED: &str = "registered";
}

/// Everything known about one sender address. Owned by exactly one turn at
/// a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub address: String,
    /// `None` until the first node has been entered.
    #[serde(default)]
    pub current_node: Option<String>,
    /// Validated answers keyed by the node that collected them. `None` is a
    /// sentinel answer such as "None of the above".
    #[serde(default)]
    pub answers: BTreeMap<String, Option<Scalar>>,
    #[serde(default)]
    pub counters: BTreeMap<String, i64>,
    /// Pagination offsets keyed by node id.
    #[serde(default)]
    pub pages: BTreeMap<String, usize>,
    #[serde(default)]
    pub lang: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSession {
    pub fn new(address: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            address: address.into(),
            current_node: None,
            answers: BTreeMap::new(),
            counters: BTreeMap::new(),
            pages: BTreeMap::new(),
            lang: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The stored answer, flattening "never answered" and sentinel answers.
    pub fn answer(&self, node: &str) -> Option<&Scalar> {
        self.answers.get(node).and_then(Option::as_ref)
    }

    /// The stored answer as text, for free-text nodes.
    pub fn answer_text(&self, node: &str) -> Option<&str> {
        self.answer(node).and_then(Scalar::as_text)
    }

    pub fn set_answer(&mut self, node: &str, value: Option<Scalar>) {
        self.answers.insert(node.to_string(), value);
    }

    pub fn counter(&self, name: &str) -> i64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn set_counter(&mut self, name: &str, value: i64) {
        self.counters.insert(name.to_string(), value);
    }

    /// Increment a counter and return its new value.
    pub fn increment(&mut self, name: &str) -> i64 {
        let value = self.counter(name) + 1;
        self.set_counter(name, value);
        value
    }

    pub fn cursor(&self, node: &str) -> usize {
        self.pages.get(node).copied().unwrap_or(0)
    }

    pub fn set_cursor(&mut self, node: &str, offset: usize) {
        if offset == 0 {
            self.pages.remove(node);
        } else {
            self.pages.insert(node.to_string(), offset);
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
