// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Strongbox credential vault.
//!
//! This crate provides the error type, the record and report types exchanged
//! between the rotation engine and its collaborators, and the two adapter
//! traits the engine consumes: [`SecretStore`] and [`RotationReporter`].

pub mod error;
pub mod report;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::StrongboxError;
pub use report::{FailureReason, Notification, Progress, RecordFailure, RotationReport, RunStatus};
pub use traits::{NullReporter, RotationReporter, SecretStore};
pub use types::{RecordId, RecordKey, Scope, SealedSecret, SecretRecord, Source};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strongbox_error_has_all_variants() {
        let _config = StrongboxError::Config("test".into());
        let _storage = StrongboxError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _vault = StrongboxError::Vault("test".into());
        let _fetch = StrongboxError::BatchFetch {
            table: Source::History,
            source: Box::new(std::io::Error::other("test")),
        };
        let _not_found = StrongboxError::NotFound {
            what: "item `db`".into(),
        };
        let _internal = StrongboxError::Internal("test".into());
    }

    #[test]
    fn source_display_and_parse_round_trip() {
        use std::str::FromStr;

        for source in [Source::Live, Source::History] {
            let s = source.to_string();
            assert_eq!(Source::from_str(&s).unwrap(), source);
        }
        assert_eq!(Source::Live.to_string(), "live");
        assert_eq!(Source::History.to_string(), "history");
    }

    #[test]
    fn scope_expands_to_sources_in_pipeline_order() {
        assert_eq!(Scope::Live.sources(), &[Source::Live]);
        assert_eq!(Scope::History.sources(), &[Source::History]);
        assert_eq!(Scope::Both.sources(), &[Source::Live, Source::History]);
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_store<T: SecretStore>() {}
        fn _assert_reporter<T: RotationReporter>() {}
        _assert_reporter::<NullReporter>();
    }
}
