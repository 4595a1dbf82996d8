//! Server enums that tolerate values this client does not know yet.

/// Declares a fieldless enum carried as a string on the wire.
///
/// Listed variants map to their literal; anything else deserializes to the
/// `_ =>` fallback variant, which serializes back as its own literal.
macro_rules! wire_enum {
	(
		$(#[$meta:meta])*
		pub enum $name:ident {
			$( $(#[$vmeta:meta])* $variant:ident = $value:literal, )+
			_ => $fallback:ident = $fvalue:literal $(,)?
		}
	) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
		#[serde(from = "String", into = "&'static str")]
		pub enum $name {
			$(
				#[doc = concat!("`", $value, "`")]
				$(#[$vmeta])*
				$variant,
			)+
			/// A value this client does not recognize.
			$fallback,
		}

		impl $name {
			/// Wire representation.
			pub fn as_str(self) -> &'static str {
				match self {
					$( Self::$variant => $value, )+
					Self::$fallback => $fvalue,
				}
			}
		}

		impl From<&str> for $name {
			fn from(value: &str) -> Self {
				match value {
					$( $value => Self::$variant, )+
					_ => Self::$fallback,
				}
			}
		}

		impl From<String> for $name {
			fn from(value: String) -> Self {
				Self::from(value.as_str())
			}
		}

		impl From<$name> for &'static str {
			fn from(value: $name) -> Self {
				value.as_str()
			}
		}

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				f.write_str(self.as_str())
			}
		}
	};
}
