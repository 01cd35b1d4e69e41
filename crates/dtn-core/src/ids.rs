//! Identifier types.
//!
//! Agents and bundles in the source simulator are addressed by user- or
//! protocol-assigned strings (an agent's id comes from its JSON config entry;
//! a bundle's id embeds its destination and creation tick), not dense array
//! indices, so `AgentId` wraps a `String` rather than using the
//! small-integer `typed_id!` pattern. `ContactId` is purely internal —
//! monotonically assigned by the Schrouter — so it stays a cheap `Copy` integer.

use std::fmt;

/// Stable identifier for an agent (router, client, or flat topology node).
///
/// Cloning an `AgentId` clones the underlying `String`; callers that need to
/// hold many copies (e.g. a contact-plan edge list) should prefer borrowing
/// (`&AgentId`) or interning at a higher layer if this becomes hot.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Monotonically increasing internal id assigned to each contact by the
/// Schrouter when it is added to a contact plan. Used as the final CGR
/// Dijkstra tie-break key (smallest contact id wins).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactId(pub i64);

impl ContactId {
    /// Sentinel used for the synthetic root contact in CGR Dijkstra.
    pub const ROOT: ContactId = ContactId(-1);

    #[inline]
    pub fn next(self) -> ContactId {
        ContactId(self.0 + 1)
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContactId({})", self.0)
    }
}
