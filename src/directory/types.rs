//! Records served by the directory and the wire shapes of its HTTP API.

use serde::{Deserialize, Serialize};

use crate::value::Scalar;

/// A directory entry ready for display: category, region, facility type,
/// facility or sub-specialty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    pub id: Scalar,
    pub title: String,
}

impl DirectoryRecord {
    pub fn new(id: impl Into<Scalar>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Health-worker registration sent at each milestone.
///
/// Serialized with the field names of the `health-workers` endpoint. Fields
/// the user skipped are omitted from the body entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSubmission {
    /// First name and surname joined by a space.
    pub name: String,
    pub surname: String,
    /// Category first, then the sub-specialty when one was chosen.
    pub specialties: Vec<Option<Scalar>>,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility: Option<Scalar>,
    pub vodacom_phone: String,
    #[serde(
        rename = "mct_registration_number",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub registration_number: Option<String>,
    #[serde(
        rename = "mct_payroll_number",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cheque_number: Option<String>,
    pub language: String,
}

impl RegistrationSubmission {
    /// True once facility details from the second session are present.
    pub fn is_complete(&self) -> bool {
        self.facility.is_some()
    }
}

/// One row of `GET specialties`. Categories are the rows without a parent.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SpecialtyRow {
    pub id: Scalar,
    pub title: String,
    #[serde(default)]
    pub short_title: Option<String>,
    #[serde(default)]
    pub parent_specialty_id: Option<i64>,
    #[serde(default)]
    pub is_query_subspecialties: bool,
}

impl SpecialtyRow {
    pub fn display_title(&self) -> &str {
        match &self.short_title {
            Some(short) if !short.is_empty() => short,
            _ => &self.title,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SpecialtiesBody {
    pub specialties: Vec<SpecialtyRow>,
}

/// Generic `{id, title}` row used by regions and facility types.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TitledRow {
    pub id: Scalar,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RegionsBody {
    pub regions: Vec<TitledRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FacilityTypesBody {
    pub facility_types: Vec<TitledRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FacilityRegion {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FacilityRow {
    pub id: Scalar,
    pub title: String,
    #[serde(default)]
    pub region: Option<FacilityRegion>,
}

impl FacilityRow {
    pub fn region_title(&self) -> Option<&str> {
        self.region
            .as_ref()
            .and_then(|r| r.title.as_deref())
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FacilitiesBody {
    pub facilities: Vec<FacilityRow>,
}

/// Response to a successful POST; `id` of the created record when present.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedBody {
    #[serde(default)]
    pub id: Option<Scalar>,
}

/// `POST specialties` body for a category the directory does not know.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct UnknownCategoryBody<'a> {
    pub msisdn: &'a str,
    pub title: &'a str,
    pub parent_specialty: Option<Scalar>,
    pub lang: &'a str,
}

/// `POST facilities` body for a facility the directory does not know.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct UnknownFacilityBody<'a> {
    pub msisdn: &'a str,
    pub title: &'a str,
    pub region: Option<&'a Scalar>,
    #[serde(rename = "type")]
    pub facility_type: Option<&'a Scalar>,
    pub address: Option<String>,
    pub lang: &'a str,
}
