//! Error handling foundation for flowstudio.
//!
//! This module provides only the `Result` type alias using rootcause.
//! Each crate defines its own domain-specific error enum in its own
//! error module and returns it wrapped in a `Report`.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_type_works() {
        let ok: Result<&str> = Ok("graph");
        assert_eq!(ok.expect("should be ok"), "graph");
    }
}
