//! Per-session state handed to each agent run.
//!
//! A `Session` is owned by exactly one request. The agent loop borrows it
//! mutably while it runs, which is how the `set_dietary_restrictions` tool
//! changes the active restrictions without any shared mutable state.

use crate::dietary::DietaryRestrictionSet;
use crate::message::ConversationId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Identifier used to correlate logs and events for one request.
    pub id: ConversationId,

    restrictions: DietaryRestrictionSet,
}

impl Session {
    /// A new session with no restrictions.
    pub fn new() -> Self {
        Self::default()
    }

    /// A new session starting from the caller's selected restrictions.
    pub fn with_restrictions(restrictions: DietaryRestrictionSet) -> Self {
        Self {
            id: ConversationId::new(),
            restrictions,
        }
    }

    pub fn restrictions(&self) -> &DietaryRestrictionSet {
        &self.restrictions
    }

    /// Overwrite the active set with `restrictions`.
    pub fn replace_restrictions(&mut self, restrictions: DietaryRestrictionSet) {
        self.restrictions = restrictions;
    }
}
