//! The policy under which example documents run.
//!
//! Examples are rendered into an [***iframe***](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/iframe)
//! with a [`sandbox`](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/iframe#attr-sandbox) attribute that never contains `allow-same-origin`.
//! The embedded document therefore runs in an opaque origin: it can't reach the host's DOM, cookies or storage,
//! and its uncaught errors are reported to its own global only.
//!
//! The embedded document may still mutate its own DOM, register timers and listeners and load third-party resources.
//! CPU fairness is not part of this boundary. A busy loop inside an example can stall the host page if the browser schedules both on the same thread.

use core::{
	fmt::{self, Display, Formatter},
	str::FromStr,
};
use thiserror::Error;

/// A single `sandbox` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SandboxToken {
	AllowScripts,
	AllowForms,
	AllowModals,
	AllowPopups,
	AllowPointerLock,
	AllowDownloads,

	// Forbidden. These exist only so they can be named in errors.
	AllowSameOrigin,
	AllowTopNavigation,
	AllowTopNavigationByUserActivation,
	AllowPopupsToEscapeSandbox,
}
impl SandboxToken {
	const ALL: [Self; 10] = [
		Self::AllowScripts,
		Self::AllowForms,
		Self::AllowModals,
		Self::AllowPopups,
		Self::AllowPointerLock,
		Self::AllowDownloads,
		Self::AllowSameOrigin,
		Self::AllowTopNavigation,
		Self::AllowTopNavigationByUserActivation,
		Self::AllowPopupsToEscapeSandbox,
	];

	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Self::AllowScripts => "allow-scripts",
			Self::AllowForms => "allow-forms",
			Self::AllowModals => "allow-modals",
			Self::AllowPopups => "allow-popups",
			Self::AllowPointerLock => "allow-pointer-lock",
			Self::AllowDownloads => "allow-downloads",
			Self::AllowSameOrigin => "allow-same-origin",
			Self::AllowTopNavigation => "allow-top-navigation",
			Self::AllowTopNavigationByUserActivation => "allow-top-navigation-by-user-activation",
			Self::AllowPopupsToEscapeSandbox => "allow-popups-to-escape-sandbox",
		}
	}

	/// Tokens that would let the embedded document reach the host (or replace it).
	#[must_use]
	pub fn is_forbidden(self) -> bool {
		matches!(
			self,
			Self::AllowSameOrigin | Self::AllowTopNavigation | Self::AllowTopNavigationByUserActivation | Self::AllowPopupsToEscapeSandbox
		)
	}

	fn bit(self) -> u16 {
		1 << self as u16
	}
}
impl Display for SandboxToken {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for SandboxToken {
	type Err = PolicyError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.iter()
			.copied()
			.find(|token| token.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| PolicyError::Unknown(s.to_owned()))
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
	#[error("sandbox token `{0}` would break isolation from the host page")]
	Forbidden(SandboxToken),
	#[error("unknown sandbox token `{0}`")]
	Unknown(String),
}

/// The set of capabilities granted to embedded example documents.
///
/// The default grants `allow-scripts allow-forms allow-modals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IsolationPolicy {
	tokens: u16,
}
impl Default for IsolationPolicy {
	fn default() -> Self {
		Self::locked()
			.granting(SandboxToken::AllowScripts)
			.granting(SandboxToken::AllowForms)
			.granting(SandboxToken::AllowModals)
	}
}
impl IsolationPolicy {
	/// No capabilities at all. Scripts don't run.
	#[must_use]
	pub const fn locked() -> Self {
		Self { tokens: 0 }
	}

	/// # Errors
	///
	/// Iff `token` [is forbidden](`SandboxToken::is_forbidden`).
	pub fn with(self, token: SandboxToken) -> Result<Self, PolicyError> {
		if token.is_forbidden() {
			Err(PolicyError::Forbidden(token))
		} else {
			Ok(self.granting(token))
		}
	}

	#[must_use]
	pub fn without(self, token: SandboxToken) -> Self {
		Self {
			tokens: self.tokens & !token.bit(),
		}
	}

	/// Parses a whitespace-separated token list, like the value of a `sandbox` attribute.
	///
	/// # Errors
	///
	/// On the first unknown or forbidden token.
	pub fn parse(tokens: &str) -> Result<Self, PolicyError> {
		tokens.split_ascii_whitespace().try_fold(Self::locked(), |policy, token| policy.with(token.parse()?))
	}

	#[must_use]
	pub fn allows(&self, token: SandboxToken) -> bool {
		self.tokens & token.bit() != 0
	}

	pub fn tokens(&self) -> impl Iterator<Item = SandboxToken> + '_ {
		SandboxToken::ALL.iter().copied().filter(move |&token| self.allows(token))
	}

	/// The `sandbox` attribute value, in a stable order.
	///
	/// An empty string is the most restrictive value, not the absence of a sandbox.
	#[must_use]
	pub fn sandbox_attribute(&self) -> String {
		self.tokens().map(SandboxToken::as_str).collect::<Vec<_>>().join(" ")
	}

	#[must_use]
	pub fn referrer_policy(&self) -> &'static str {
		"no-referrer"
	}

	const fn granting(self, token: SandboxToken) -> Self {
		Self {
			tokens: self.tokens | 1 << token as u16,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_allows_scripts_but_not_same_origin() {
		let policy = IsolationPolicy::default();
		assert!(policy.allows(SandboxToken::AllowScripts));
		assert!(!policy.allows(SandboxToken::AllowSameOrigin));
		assert!(!policy.allows(SandboxToken::AllowTopNavigation));
		assert_eq!(policy.sandbox_attribute(), "allow-scripts allow-forms allow-modals");
	}

	#[test]
	fn locked_is_empty_attribute() {
		assert_eq!(IsolationPolicy::locked().sandbox_attribute(), "");
	}

	#[test]
	fn forbidden_tokens_are_rejected() {
		for token in SandboxToken::ALL.iter().copied().filter(|t| t.is_forbidden()) {
			assert_eq!(IsolationPolicy::default().with(token), Err(PolicyError::Forbidden(token)));
		}
	}

	#[test]
	fn parse() {
		let policy = IsolationPolicy::parse(" allow-popups\tallow-scripts ").unwrap();
		assert_eq!(policy.sandbox_attribute(), "allow-scripts allow-popups");

		assert_eq!(
			IsolationPolicy::parse("allow-scripts allow-same-origin"),
			Err(PolicyError::Forbidden(SandboxToken::AllowSameOrigin))
		);
		assert_eq!(IsolationPolicy::parse("allow-everything"), Err(PolicyError::Unknown("allow-everything".to_owned())));
	}

	#[test]
	fn without() {
		let policy = IsolationPolicy::default().without(SandboxToken::AllowModals);
		assert_eq!(policy.sandbox_attribute(), "allow-scripts allow-forms");
	}
}
