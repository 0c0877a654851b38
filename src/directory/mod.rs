//! Directory of health-worker reference data (categories, regions, facility
//! types, facilities, sub-specialties) and the sink for registrations.
//!
//! The dialogue only sees the [`Directory`] trait. [`StubDirectory`] serves
//! canned data for offline use; [`SwitchboardClient`] talks to the live HTTP
//! API.

pub mod client;
pub mod error;
pub mod normalize;
pub mod stub;
pub mod types;

use async_trait::async_trait;

pub use client::SwitchboardClient;
pub use error::{DirectoryCause, DirectoryError, Verb};
pub use normalize::sanitize_title;
pub use stub::StubDirectory;
pub use types::{DirectoryRecord, RegistrationSubmission};

use crate::value::Scalar;

/// Every lookup and unknown-entry submission takes the language its titles
/// should be served in.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Top-level job categories ("cadres").
    async fn list_categories(&self, lang: &str) -> Result<Vec<DirectoryRecord>, DirectoryError>;

    /// Districts whose title matches `query`.
    async fn list_regions(
        &self,
        lang: &str,
        query: &str,
    ) -> Result<Vec<DirectoryRecord>, DirectoryError>;

    async fn list_facility_types(&self, lang: &str)
    -> Result<Vec<DirectoryRecord>, DirectoryError>;

    /// Facilities matching `query`, optionally narrowed by region and type.
    /// Duplicate titles are already disambiguated.
    async fn list_facilities(
        &self,
        lang: &str,
        region: Option<&Scalar>,
        facility_type: Option<&Scalar>,
        query: &str,
    ) -> Result<Vec<DirectoryRecord>, DirectoryError>;

    async fn list_sub_specialties(
        &self,
        lang: &str,
        category: &Scalar,
    ) -> Result<Vec<DirectoryRecord>, DirectoryError>;

    async fn category_requires_sub_specialty(
        &self,
        lang: &str,
        category: &Scalar,
    ) -> Result<bool, DirectoryError>;

    /// Record a category the directory does not list, for manual follow-up.
    /// Duplicate submissions are rejected by the service and tolerated here,
    /// returning `Ok(None)`.
    async fn submit_unknown_category(
        &self,
        lang: &str,
        address: &str,
        title: &str,
    ) -> Result<Option<Scalar>, DirectoryError>;

    /// Same tolerance as [`Directory::submit_unknown_category`].
    async fn submit_unknown_facility(
        &self,
        lang: &str,
        address: &str,
        title: &str,
        region: Option<&Scalar>,
        facility_type: Option<&Scalar>,
    ) -> Result<Option<Scalar>, DirectoryError>;

    async fn submit_registration(
        &self,
        submission: &RegistrationSubmission,
    ) -> Result<Option<Scalar>, DirectoryError>;
}
