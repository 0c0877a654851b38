//! Offline directory with fixed data, used when no API is configured.

use std::sync::Mutex;

use async_trait::async_trait;

use super::types::{DirectoryRecord, RegistrationSubmission};
use super::{Directory, DirectoryError};
use crate::value::Scalar;

/// Categories with these ids need a sub-specialty.
const CATEGORIES_WITH_SUB_SPECIALTIES: [i64; 3] = [1, 67, 60];

fn record(id: impl Into<Scalar>, title: &str) -> DirectoryRecord {
    DirectoryRecord::new(id, title)
}

/// A submission captured by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubSubmission {
    UnknownCategory {
        address: String,
        title: String,
        lang: String,
    },
    UnknownFacility {
        address: String,
        lang: String,
        title: String,
        region: Option<Scalar>,
        facility_type: Option<Scalar>,
    },
    Registration(RegistrationSubmission),
}

/// Canned directory. Submissions succeed and are kept for inspection.
#[derive(Debug, Default)]
pub struct StubDirectory {
    submissions: Mutex<Vec<StubSubmission>>,
}

impl StubDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> Vec<StubSubmission> {
        self.lock().clone()
    }

    pub fn registrations(&self) -> Vec<RegistrationSubmission> {
        self.lock()
            .iter()
            .filter_map(|s| match s {
                StubSubmission::Registration(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<StubSubmission>> {
        // A poisoned log is still a usable log.
        self.submissions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, submission: StubSubmission) {
        tracing::debug!(?submission, "stub directory accepted submission");
        self.lock().push(submission);
    }
}

#[async_trait]
impl Directory for StubDirectory {
    async fn list_categories(&self, _lang: &str) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        // Medical Specialist, AMO and Dental Specialist carry the numeric ids
        // of the categories with sub-specialties.
        Ok(vec![
            record(1i64, "Medical Specialist"),
            record("mo", "MO"),
            record(60i64, "AMO"),
            record("co", "CO"),
            record("aco", "ACO"),
            record(67i64, "Dental Specialist"),
            record("do", "Dental Officer"),
            record("ado", "ADO"),
            record("dt", "Dental Therapist"),
        ])
    }

    async fn list_regions(
        &self,
        _lang: &str,
        _query: &str,
    ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        Ok(vec![
            record("kigoma-mc", "Kigoma MC"),
            record("kigoma-dc", "Kigoma DC"),
            record("kasulu-dc", "Kasulu DC"),
        ])
    }

    async fn list_facility_types(
        &self,
        _lang: &str,
    ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        Ok(vec![
            record("hospital", "Hospital"),
            record("health-centre", "Health Centre"),
            record("dispensary", "Dispensary"),
            record("clinic", "Clinic"),
            record("mhsw", "Ministry of Health and Social Welfare"),
            record("council", "Council"),
            record("training", "Training Institution"),
            record("zonal-training", "Zonal Training Centre"),
            record("ngo", "NGO"),
        ])
    }

    async fn list_facilities(
        &self,
        _lang: &str,
        _region: Option<&Scalar>,
        _facility_type: Option<&Scalar>,
        _query: &str,
    ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        Ok(vec![
            record("wazazi-galapo", "Wazazi Galapo"),
            record("wazazi-magugu", "Wazazi Magugu"),
            record("wazazu-mchuo", "Wazazu Mchuo"),
        ])
    }

    async fn list_sub_specialties(
        &self,
        _lang: &str,
        category: &Scalar,
    ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        let records = match category.as_number() {
            Some(67) => vec![
                record("cd", "Community Dentistry"),
                record("ms", "Maxilofacial Surgery"),
            ],
            Some(1) => vec![
                record("anaesthesia", "Anaesthesia"),
                record("anatomy", "Anatomy"),
            ],
            Some(60) => vec![
                record("anaesthesiology", "Anaesthesiology"),
                record("em", "Emergency Medicime"),
            ],
            _ => Vec::new(),
        };
        Ok(records)
    }

    async fn category_requires_sub_specialty(
        &self,
        _lang: &str,
        category: &Scalar,
    ) -> Result<bool, DirectoryError> {
        Ok(category
            .as_number()
            .is_some_and(|id| CATEGORIES_WITH_SUB_SPECIALTIES.contains(&id)))
    }

    async fn submit_unknown_category(
        &self,
        lang: &str,
        address: &str,
        title: &str,
    ) -> Result<Option<Scalar>, DirectoryError> {
        self.push(StubSubmission::UnknownCategory {
            address: address.to_string(),
            title: title.to_string(),
            lang: lang.to_string(),
        });
        Ok(None)
    }

    async fn submit_unknown_facility(
        &self,
        lang: &str,
        address: &str,
        title: &str,
        region: Option<&Scalar>,
        facility_type: Option<&Scalar>,
    ) -> Result<Option<Scalar>, DirectoryError> {
        self.push(StubSubmission::UnknownFacility {
            address: address.to_string(),
            lang: lang.to_string(),
            title: title.to_string(),
            region: region.cloned(),
            facility_type: facility_type.cloned(),
        });
        Ok(None)
    }

    async fn submit_registration(
        &self,
        submission: &RegistrationSubmission,
    ) -> Result<Option<Scalar>, DirectoryError> {
        self.push(StubSubmission::Registration(submission.clone()));
        Ok(None)
    }
}
