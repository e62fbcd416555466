//! Strongly typed identifiers for registered APIs and composable modules.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}

			/// Wraps a crate-owned literal that is known to be valid.
			pub(crate) fn from_static(value: &'static str) -> Self {
				debug_assert!(validate_view($kind, value).is_ok(), "invalid built-in identifier");

				Self(value.to_owned())
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (api, module).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (api, module).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (api, module).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { ApiId, "Unique identifier for a registered API descriptor.", "Api" }
def_id! { ModuleId, "Identifier naming a composable client module.", "Module" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_whitespace_and_empty_values() {
		assert!(ApiId::new(" openstack-heat").is_err(), "Leading whitespace must be rejected.");
		assert!(ApiId::new("openstack-heat ").is_err(), "Trailing whitespace must be rejected.");
		assert!(ModuleId::new("").is_err());
		assert!(ModuleId::new("heat http").is_err());

		let id = ApiId::new("openstack-heat").expect("Api fixture should be considered valid.");

		assert_eq!(id.as_ref(), "openstack-heat");
		assert_eq!(format!("{id:?}"), "Api(openstack-heat)");
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let id: ModuleId = serde_json::from_str("\"heat-http-api\"")
			.expect("Module identifier should deserialize successfully.");

		assert_eq!(id.as_ref(), "heat-http-api");
		assert!(serde_json::from_str::<ModuleId>("\"with space\"").is_err());
	}

	#[test]
	fn length_limit_is_inclusive() {
		ApiId::new("a".repeat(IDENTIFIER_MAX_LEN)).expect("Exact length should succeed.");

		assert!(matches!(
			ApiId::new("a".repeat(IDENTIFIER_MAX_LEN + 1)),
			Err(IdentifierError::TooLong { kind: "Api", .. })
		));
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<ApiId, u8> = HashMap::from_iter([(
			ApiId::new("openstack-heat").expect("Api used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("openstack-heat"), Some(&7));
	}
}
