use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{DirectoryCause, DirectoryError, Verb};
use super::normalize::{disambiguate_titles, sanitize_title};
use super::types::{
    CreatedBody, DirectoryRecord, FacilitiesBody, FacilityTypesBody, RegionsBody,
    RegistrationSubmission, SpecialtiesBody, UnknownCategoryBody, UnknownFacilityBody,
};
use super::Directory;
use crate::error::ConfigError;
use crate::value::Scalar;

/// Longest msisdn the registry accepts.
const MAX_MSISDN_LEN: usize = 32;

/// Live client for the Switchboard health-worker registry.
pub struct SwitchboardClient {
    client: Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl SwitchboardClient {
    /// `base_url` is joined to endpoint names verbatim, so it should end
    /// with a slash.
    pub fn new(
        base_url: impl Into<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("directory url must not be empty".into()));
        }
        let credentials = match (username, password) {
            (Some(user), Some(pass)) => Some((user, pass)),
            (Some(user), None) => {
                return Err(ConfigError::Invalid(format!(
                    "directory username `{user}` configured without a password"
                )));
            }
            (None, _) => None,
        };
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some((user, pass)) => request.basic_auth(user, Some(pass)),
            None => request,
        }
    }

    /// Accept a reply only if it is HTTP 200 and carries `"status": 0`.
    async fn check_reply(response: reqwest::Response) -> Result<serde_json::Value, DirectoryCause> {
        let status = response.status();
        if status != StatusCode::OK {
            return Err(DirectoryCause::HttpStatus(status.as_u16()));
        }
        let body = response.text().await?;
        let json: serde_json::Value = serde_json::from_str(&body)?;
        match json.get("status").and_then(serde_json::Value::as_i64) {
            Some(0) => Ok(json),
            Some(other) => Err(DirectoryCause::AppStatus(other)),
            None => Err(DirectoryCause::AppStatus(-1)),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, DirectoryError> {
        let url = self.url(endpoint);
        tracing::debug!(%url, ?params, "directory lookup");
        let result = async {
            let response = self.authorize(self.client.get(&url)).query(params).send().await?;
            let json = Self::check_reply(response).await?;
            Ok::<T, DirectoryCause>(serde_json::from_value(json)?)
        }
        .await;
        result.map_err(|cause| {
            let err = DirectoryError::new(Verb::Get, &url, cause);
            tracing::error!("{err}");
            err
        })
    }

    /// POST a JSON body. With `ignore_errors` a failure is logged and
    /// reported as `Ok(None)`.
    async fn post<B: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &B,
        ignore_errors: bool,
    ) -> Result<Option<Scalar>, DirectoryError> {
        let url = self.url(endpoint);
        let result = async {
            let response = self
                .authorize(self.client.post(&url))
                .json(body)
                .send()
                .await?;
            let json = Self::check_reply(response).await?;
            let created: CreatedBody = serde_json::from_value(json)?;
            Ok::<Option<Scalar>, DirectoryCause>(created.id)
        }
        .await;

        match result {
            Ok(id) => Ok(id),
            Err(cause) => {
                let payload = serde_json::to_string(body).ok();
                let err = DirectoryError::new(Verb::Post, &url, cause).with_payload(payload);
                tracing::error!("{err}");
                if ignore_errors { Ok(None) } else { Err(err) }
            }
        }
    }

    async fn specialties(&self, lang: &str) -> Result<SpecialtiesBody, DirectoryError> {
        self.get("specialties", &[lang_param(lang)]).await
    }
}

fn lang_param(lang: &str) -> (&'static str, String) {
    ("lang", lang.to_string())
}

fn msisdn(address: &str) -> String {
    address.chars().take(MAX_MSISDN_LEN).collect()
}

#[async_trait]
impl Directory for SwitchboardClient {
    async fn list_categories(&self, lang: &str) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        let body = self.specialties(lang).await?;
        Ok(body
            .specialties
            .iter()
            .filter(|s| s.parent_specialty_id.is_none())
            .map(|s| DirectoryRecord::new(s.id.clone(), sanitize_title(s.display_title())))
            .collect())
    }

    async fn list_regions(
        &self,
        lang: &str,
        query: &str,
    ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        let body: RegionsBody = self
            .get(
                "regions",
                &[
                    ("type", "District".to_string()),
                    ("title", query.to_string()),
                    lang_param(lang),
                ],
            )
            .await?;
        Ok(body
            .regions
            .into_iter()
            .map(|r| DirectoryRecord::new(r.id, sanitize_title(&r.title)))
            .collect())
    }

    async fn list_facility_types(
        &self,
        lang: &str,
    ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        let body: FacilityTypesBody = self.get("facility-types", &[lang_param(lang)]).await?;
        Ok(body
            .facility_types
            .into_iter()
            .map(|f| DirectoryRecord::new(f.id, sanitize_title(&f.title)))
            .collect())
    }

    async fn list_facilities(
        &self,
        lang: &str,
        region: Option<&Scalar>,
        facility_type: Option<&Scalar>,
        query: &str,
    ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        let mut params = vec![("title", query.to_string()), lang_param(lang)];
        if let Some(region) = region {
            params.push(("region", region.to_string()));
        }
        if let Some(facility_type) = facility_type {
            params.push(("type", facility_type.to_string()));
        }
        let body: FacilitiesBody = self.get("facilities", &params).await?;
        Ok(disambiguate_titles(&body.facilities))
    }

    async fn list_sub_specialties(
        &self,
        lang: &str,
        category: &Scalar,
    ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        let body = self.specialties(lang).await?;
        let Some(category_id) = category.as_number() else {
            return Ok(Vec::new());
        };
        Ok(body
            .specialties
            .iter()
            .filter(|s| s.parent_specialty_id == Some(category_id))
            .map(|s| DirectoryRecord::new(s.id.clone(), sanitize_title(s.display_title())))
            .collect())
    }

    async fn category_requires_sub_specialty(
        &self,
        lang: &str,
        category: &Scalar,
    ) -> Result<bool, DirectoryError> {
        let body = self.specialties(lang).await?;
        let Some(category_id) = category.as_number() else {
            return Ok(false);
        };
        let mut matches = body
            .specialties
            .iter()
            .filter(|s| s.id.as_number() == Some(category_id));
        match (matches.next(), matches.next()) {
            (Some(row), None) => Ok(row.is_query_subspecialties),
            _ => Ok(false),
        }
    }

    async fn submit_unknown_category(
        &self,
        lang: &str,
        address: &str,
        title: &str,
    ) -> Result<Option<Scalar>, DirectoryError> {
        let msisdn = msisdn(address);
        let body = UnknownCategoryBody {
            msisdn: &msisdn,
            title,
            parent_specialty: None,
            lang,
        };
        // TODO: propagate failures once the registry accepts duplicate titles.
        self.post("specialties", &body, true).await
    }

    async fn submit_unknown_facility(
        &self,
        lang: &str,
        address: &str,
        title: &str,
        region: Option<&Scalar>,
        facility_type: Option<&Scalar>,
    ) -> Result<Option<Scalar>, DirectoryError> {
        let msisdn = msisdn(address);
        let body = UnknownFacilityBody {
            msisdn: &msisdn,
            title,
            region,
            facility_type,
            address: None,
            lang,
        };
        // TODO: propagate failures once the registry accepts duplicate titles.
        self.post("facilities", &body, true).await
    }

    async fn submit_registration(
        &self,
        submission: &RegistrationSubmission,
    ) -> Result<Option<Scalar>, DirectoryError> {
        self.post("health-workers", submission, false).await
    }
}
