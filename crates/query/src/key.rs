//! Typed cache addresses.

use std::fmt;

/// Collection type tag, e.g. "members of a squad".
///
/// Kinds are declared as constants by the crates that own the collection, so
/// two collections can never collide on an ad hoc string key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKind(&'static str);

impl QueryKind {
	/// Declares a kind. Names must be unique across the application.
	pub const fn new(name: &'static str) -> Self {
		Self(name)
	}

	/// The kind's name.
	pub const fn as_str(self) -> &'static str {
		self.0
	}
}

impl fmt::Display for QueryKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.0)
	}
}

/// Non-empty id of the entity a collection belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(String);

impl ScopeId {
	/// Returns `None` for an empty id.
	pub fn new(id: impl Into<String>) -> Option<Self> {
		let id = id.into();
		(!id.is_empty()).then_some(Self(id))
	}

	/// Converts a possibly absent id; absent and empty ids both yield `None`.
	pub fn from_optional(id: Option<&str>) -> Option<Self> {
		id.and_then(Self::new)
	}

	/// The raw id.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ScopeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Address of one logical collection in the [`QueryCache`](crate::QueryCache).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
	kind: QueryKind,
	scope: ScopeId,
}

impl QueryKey {
	/// Builds a key.
	pub const fn new(kind: QueryKind, scope: ScopeId) -> Self {
		Self { kind, scope }
	}

	/// Collection kind.
	pub const fn kind(&self) -> QueryKind {
		self.kind
	}

	/// Scoping id.
	pub const fn scope(&self) -> &ScopeId {
		&self.scope
	}
}

impl fmt::Display for QueryKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.kind, self.scope)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MEMBERS: QueryKind = QueryKind::new("squadMembers");
	const NOTIFICATIONS: QueryKind = QueryKind::new("notifications");

	#[test]
	fn empty_ids_are_absent() {
		assert!(ScopeId::new("").is_none());
		assert!(ScopeId::from_optional(None).is_none());
		assert!(ScopeId::from_optional(Some("")).is_none());
		assert_eq!(ScopeId::from_optional(Some("squad-42")).unwrap().as_str(), "squad-42");
	}

	#[test]
	fn kind_is_part_of_identity() {
		let scope = ScopeId::new("42").unwrap();
		let a = QueryKey::new(MEMBERS, scope.clone());
		let b = QueryKey::new(NOTIFICATIONS, scope);
		assert_ne!(a, b);
		assert_eq!(a.to_string(), "squadMembers:42");
	}
}
