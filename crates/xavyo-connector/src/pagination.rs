//! Opaque pagination tokens.
//!
//! The host hands a [`PageToken`] to every list call. Connectors keep their
//! own cursor state in a [`PageBag`], a stack of [`PageState`]s serialized
//! into the token string. Hosts must treat the string as opaque.

use serde::{Deserialize, Serialize};

use crate::error::{ConnectorError, ConnectorResult};

/// Page request supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageToken {
    /// Requested page size. Zero lets the connector pick its default.
    pub size: u32,
    /// Token returned by the previous call, empty for the first page.
    pub token: String,
}

impl PageToken {
    /// Token for the first page.
    #[must_use]
    pub fn first(size: u32) -> Self {
        Self {
            size,
            token: String::new(),
        }
    }

    /// Token for a following page.
    #[must_use]
    pub fn next(size: u32, token: impl Into<String>) -> Self {
        Self {
            size,
            token: token.into(),
        }
    }

    /// Whether this requests the first page.
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.token.is_empty()
    }
}

/// Cursor position inside one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    /// Upstream continuation cursor, empty for the first page.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub resource_type_id: String,
    #[serde(rename = "id", default, skip_serializing_if = "String::is_empty")]
    pub resource_id: String,
}

impl PageState {
    /// First-page state for a resource type.
    #[must_use]
    pub fn for_resource_type(resource_type_id: impl Into<String>) -> Self {
        Self {
            resource_type_id: resource_type_id.into(),
            ..Default::default()
        }
    }
}

/// Stack of cursor states carried in the page token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBag {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    states: Vec<PageState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_state: Option<PageState>,
}

impl PageBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a token. The empty string yields an empty bag.
    pub fn unmarshal(token: &str) -> ConnectorResult<Self> {
        if token.is_empty() {
            return Ok(Self::new());
        }
        serde_json::from_str(token).map_err(|e| ConnectorError::InvalidPageToken {
            message: e.to_string(),
        })
    }

    /// Encode the bag. A bag with no current state encodes to the empty string.
    pub fn marshal(&self) -> ConnectorResult<String> {
        if self.current_state.is_none() {
            return Ok(String::new());
        }
        Ok(serde_json::to_string(self)?)
    }

    /// Make `state` current, saving the previous current state.
    pub fn push(&mut self, state: PageState) {
        if let Some(previous) = self.current_state.take() {
            self.states.push(previous);
        }
        self.current_state = Some(state);
    }

    /// Drop the current state and restore the one saved beneath it.
    pub fn pop(&mut self) -> Option<PageState> {
        let popped = self.current_state.take();
        self.current_state = self.states.pop();
        popped
    }

    /// Current state, if any.
    #[must_use]
    pub fn current(&self) -> Option<&PageState> {
        self.current_state.as_ref()
    }

    /// Upstream cursor of the current state, empty when there is none.
    #[must_use]
    pub fn page_token(&self) -> &str {
        self.current_state
            .as_ref()
            .map_or("", |state| state.token.as_str())
    }

    /// Advance the current state to `next_token`.
    ///
    /// An empty `next_token` means the listing is exhausted and the current
    /// state is popped.
    pub fn next(&mut self, next_token: &str) {
        if let Some(mut state) = self.pop() {
            if !next_token.is_empty() {
                state.token = next_token.to_string();
                self.push(state);
            }
        }
    }

    /// Advance with `next_token` and marshal the result.
    pub fn next_token(&mut self, next_token: &str) -> ConnectorResult<String> {
        self.next(next_token);
        self.marshal()
    }

    /// Decode `token` and push a first-page state for `resource_type_id`
    /// when nothing is current yet.
    pub fn resume(token: &str, resource_type_id: &str) -> ConnectorResult<Self> {
        let mut bag = Self::unmarshal(token)?;
        if bag.current().is_none() {
            bag.push(PageState::for_resource_type(resource_type_id));
        }
        Ok(bag)
    }
}
