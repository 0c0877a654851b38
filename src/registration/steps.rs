//! Routes, choice sources and entry hooks specific to registration.

use async_trait::async_trait;

use super::ids::*;
use super::submission::{self, is_skip};
use super::texts;
use crate::dialogue::{Accepted, ChoiceSource, EntryHook, NodeId, Route, TurnContext};
use crate::directory::DirectoryRecord;
use crate::error::TurnError;
use crate::pagination::ChoiceOption;
use crate::session::counters;
use crate::value::Scalar;

/// Transitions that need the session, the directory or configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Senders outside the allow-list cannot register.
    LanguageGate,
    /// Yes records the unlisted category for follow-up.
    UnknownCategory,
    /// A skipped cheque number asks for the registration number instead.
    ChequeNumber,
    /// Free-text district search. A single match is taken as the answer.
    DistrictLookup,
    /// "None of the above" allows one re-entry of the district.
    DistrictChosen,
    /// Free-text facility search. A single match is taken as the answer.
    FacilityLookup,
    /// "None of the above" records the unlisted facility for follow-up.
    FacilityChosen,
    /// A completed registration stays completed, except in QA mode.
    Session2Restart,
}

#[async_trait]
impl Route for Step {
    fn targets(&self) -> Vec<NodeId> {
        match self {
            Step::LanguageGate => vec![CADRE, NO_VODACOM_SIM],
            Step::UnknownCategory => vec![
                CADRE_UNAVAILABLE_CONTACT,
                CADRE_UNAVAILABLE_DONT_CONTACT,
                CADRE,
            ],
            Step::ChequeNumber => vec![REGISTRATION_NUMBER, TERMS_AND_CONDITIONS],
            Step::DistrictLookup => vec![FACILITY_TYPE, DISTRICT_SELECT],
            Step::DistrictChosen => vec![DISTRICT_REENTER, FACILITY_TYPE],
            Step::FacilityLookup => vec![FACILITY_SELECT, SELECT_SPECIALITY, SESSION2_END],
            Step::FacilityChosen => vec![SELECT_SPECIALITY, SESSION2_END],
            Step::Session2Restart => vec![SESSION2_END, INTRO],
        }
    }

    async fn next(
        &self,
        ctx: &mut TurnContext<'_>,
        accepted: &Accepted,
    ) -> Result<NodeId, TurnError> {
        match self {
            Step::LanguageGate => Ok(if ctx.services.address_policy.allows(ctx.address()) {
                CADRE
            } else {
                tracing::info!(from = ctx.address(), "sender not on the allow-list");
                NO_VODACOM_SIM
            }),
            Step::UnknownCategory => match accepted.value.as_ref().and_then(Scalar::as_text) {
                Some("yes") => {
                    let title = ctx.session.answer_text(CADRE_OTHER).unwrap_or_default();
                    if let Err(e) = ctx
                        .services
                        .directory
                        .submit_unknown_category(ctx.lang(), ctx.address(), title)
                        .await
                    {
                        tracing::warn!("unknown category not recorded: {e}");
                    }
                    Ok(CADRE_UNAVAILABLE_CONTACT)
                }
                Some("back") => Ok(CADRE),
                _ => Ok(CADRE_UNAVAILABLE_DONT_CONTACT),
            },
            Step::ChequeNumber => Ok(if is_skip(&accepted.raw) {
                REGISTRATION_NUMBER
            } else {
                TERMS_AND_CONDITIONS
            }),
            Step::DistrictLookup => {
                let regions = ctx
                    .services
                    .directory
                    .list_regions(ctx.lang(), &accepted.raw)
                    .await?;
                tracing::debug!(query = %accepted.raw, matches = regions.len(), "district lookup");
                match regions.as_slice() {
                    [only] => {
                        ctx.session.set_answer(DISTRICT_SELECT, Some(only.id.clone()));
                        Ok(FACILITY_TYPE)
                    }
                    _ => Ok(DISTRICT_SELECT),
                }
            }
            Step::DistrictChosen => {
                let reentered = ctx.session.answer_text(DISTRICT_REENTER).is_some();
                Ok(if accepted.value.is_none() && !reentered {
                    DISTRICT_REENTER
                } else {
                    FACILITY_TYPE
                })
            }
            Step::FacilityLookup => {
                let district = ctx.session.answer(DISTRICT_SELECT).cloned();
                let facility_type = ctx.session.answer(FACILITY_TYPE).cloned();
                let facilities = ctx
                    .services
                    .directory
                    .list_facilities(
                        ctx.lang(),
                        district.as_ref(),
                        facility_type.as_ref(),
                        &accepted.raw,
                    )
                    .await?;
                tracing::debug!(
                    query = %accepted.raw,
                    matches = facilities.len(),
                    "facility lookup"
                );
                match facilities.as_slice() {
                    [only] => {
                        ctx.session.set_answer(FACILITY_SELECT, Some(only.id.clone()));
                        after_facility(ctx).await
                    }
                    _ => Ok(FACILITY_SELECT),
                }
            }
            Step::FacilityChosen => {
                if accepted.value.is_none() {
                    let district = ctx.session.answer(DISTRICT_SELECT).cloned();
                    let facility_type = ctx.session.answer(FACILITY_TYPE).cloned();
                    let title = ctx.session.answer_text(FACILITY_NAME).unwrap_or_default();
                    if let Err(e) = ctx
                        .services
                        .directory
                        .submit_unknown_facility(
                            ctx.lang(),
                            ctx.address(),
                            title,
                            district.as_ref(),
                            facility_type.as_ref(),
                        )
                        .await
                    {
                        tracing::warn!("unknown facility not recorded: {e}");
                    }
                }
                after_facility(ctx).await
            }
            Step::Session2Restart => Ok(if ctx.services.qa { INTRO } else { SESSION2_END }),
        }
    }
}

/// Categories with sub-specialties ask for one before finishing.
async fn after_facility(ctx: &mut TurnContext<'_>) -> Result<NodeId, TurnError> {
    let needs_specialty = match ctx.session.answer(CADRE).cloned() {
        Some(category) => {
            ctx.services
                .directory
                .category_requires_sub_specialty(ctx.lang(), &category)
                .await?
        }
        None => false,
    };
    Ok(if needs_specialty {
        SELECT_SPECIALITY
    } else {
        SESSION2_END
    })
}

/// Directory-backed option lists, each ending with a sentinel entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Categories,
    /// Regions matching the re-entered district, else the first one.
    Regions,
    FacilityTypes,
    Facilities,
    SubSpecialties,
}

fn with_trailer(records: Vec<DirectoryRecord>, trailer: ChoiceOption) -> Vec<ChoiceOption> {
    records
        .into_iter()
        .map(|r| ChoiceOption::new(r.id, r.title))
        .chain(std::iter::once(trailer))
        .collect()
}

#[async_trait]
impl ChoiceSource for Lookup {
    async fn options(&self, ctx: &TurnContext<'_>) -> Result<Vec<ChoiceOption>, TurnError> {
        let directory = &ctx.services.directory;
        let session = &*ctx.session;
        let lang = ctx.lang();
        let options = match self {
            Lookup::Categories => with_trailer(
                directory.list_categories(lang).await?,
                ChoiceOption::new("other", texts::OTHER),
            ),
            Lookup::Regions => {
                let query = session
                    .answer_text(DISTRICT_REENTER)
                    .or_else(|| session.answer_text(SESSION2_INTRO))
                    .unwrap_or_default();
                with_trailer(
                    directory.list_regions(lang, query).await?,
                    ChoiceOption::sentinel(texts::NONE_OF_THE_ABOVE),
                )
            }
            Lookup::FacilityTypes => with_trailer(
                directory.list_facility_types(lang).await?,
                ChoiceOption::sentinel(texts::OTHER),
            ),
            Lookup::Facilities => {
                let query = session.answer_text(FACILITY_NAME).unwrap_or_default();
                with_trailer(
                    directory
                        .list_facilities(
                            lang,
                            session.answer(DISTRICT_SELECT),
                            session.answer(FACILITY_TYPE),
                            query,
                        )
                        .await?,
                    ChoiceOption::sentinel(texts::NONE_OF_THE_ABOVE),
                )
            }
            Lookup::SubSpecialties => {
                let records = match session.answer(CADRE) {
                    Some(category) => directory.list_sub_specialties(lang, category).await?,
                    None => Vec::new(),
                };
                with_trailer(records, ChoiceOption::sentinel(texts::OTHER))
            }
        };
        Ok(options)
    }
}

/// Side effects of entering a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    /// A new district search starts without a previous re-entry.
    ForgetDistrictReenter,
    Session1Abort,
    /// Partial registration, first milestone.
    Session1End,
    /// Complete registration, second milestone.
    Session2End,
}

#[async_trait]
impl EntryHook for Milestone {
    async fn on_enter(&self, ctx: &mut TurnContext<'_>) -> Result<(), TurnError> {
        match self {
            Milestone::ForgetDistrictReenter => {
                ctx.session.answers.remove(DISTRICT_REENTER);
            }
            Milestone::Session1Abort => {
                ctx.services
                    .notifier
                    .send_sms(ctx.address(), texts::sms::SESSION1_ABORT)
                    .await;
            }
            Milestone::Session1End => {
                let registration = submission::build(ctx.session, &ctx.services.default_lang);
                ctx.services
                    .directory
                    .submit_registration(&registration)
                    .await?;
                tracing::info!(from = ctx.address(), "first session completed");

                let services = ctx.services;
                services.metrics.incr_metric("first_session_completed").await;
                services
                    .notifier
                    .send_sms(ctx.address(), texts::sms::SESSION1_END)
                    .await;
                // Only the first registration counts towards the average.
                if ctx.session.counter(counters::REGISTERED) == 0 {
                    ctx.session.set_counter(counters::REGISTERED, 1);
                    let sessions = ctx.session.counter(counters::USSD_SESSIONS);
                    services
                        .metrics
                        .fire_avg("sessions_taken_to_register", sessions as f64);
                }
            }
            Milestone::Session2End => {
                let registration = submission::build(ctx.session, &ctx.services.default_lang);
                ctx.services
                    .directory
                    .submit_registration(&registration)
                    .await?;
                tracing::info!(from = ctx.address(), "registration completed");

                ctx.services
                    .notifier
                    .send_sms(ctx.address(), texts::sms::SESSION2_END)
                    .await;
                ctx.services
                    .metrics
                    .incr_metric("second_session_completed")
                    .await;
            }
        }
        Ok(())
    }
}
