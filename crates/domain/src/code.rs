//! Bidirectional mapping between closed enumerations and protocol codes.
//!
//! Every enumeration exchanged over the wire implements [`WireCode`]. The
//! forward direction is an exhaustive `match`; the reverse direction is a
//! linear scan over [`WireCode::ALL`], which is fine at this cardinality.
//! When two variants share a code, decoding yields the one listed first.

use crate::error::DecodeError;

/// An enumeration with a fixed protocol code per variant.
pub trait WireCode: Copy + Eq + Sized + 'static {
    /// Human-readable name of the table, used in decode errors.
    const KIND: &'static str;

    /// Every variant, in table order.
    const ALL: &'static [Self];

    /// The decimal-string code sent over the wire.
    fn code(self) -> &'static str;

    /// Look a code up in the table.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownCode`] when no variant carries `code`.
    fn from_code(code: &str) -> Result<Self, DecodeError> {
        Self::ALL
            .iter()
            .copied()
            .find(|variant| variant.code() == code)
            .ok_or_else(|| DecodeError::UnknownCode {
                kind: Self::KIND,
                code: code.to_string(),
            })
    }
}

/// Declare an enumeration together with its [`WireCode`] table.
macro_rules! wire_codes {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::code::WireCode for $name {
            const KIND: &'static str = $kind;
            const ALL: &'static [Self] = &[ $( Self::$variant ),+ ];

            fn code(self) -> &'static str {
                match self {
                    $( Self::$variant => $code ),+
                }
            }
        }
    };
}

pub(crate) use wire_codes;
