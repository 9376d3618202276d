//! # Error Types
//!
//! Parse failures for the textual forms of core types. Conversion failures
//! live with the codec; this crate only ever fails while reading text.

use thiserror::Error;

/// Error while parsing the lexical form of a core type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The text is not a qualified name of the form `(namespace)local` or
    /// `(namespace?revision=R)local`.
    #[error("invalid qualified name '{0}'")]
    InvalidQName(String),

    /// The text is not a decimal64 literal with the given scale.
    #[error("invalid decimal64 literal '{literal}' for {fraction_digits} fraction digits")]
    InvalidDecimal {
        /// The rejected literal.
        literal: String,
        /// Declared scale of the target type.
        fraction_digits: u8,
    },
}
