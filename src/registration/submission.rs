use super::ids;
use crate::directory::RegistrationSubmission;
use crate::session::UserSession;

/// `0`, `O` and `o` mean "I don't have one".
pub fn is_skip(answer: &str) -> bool {
    matches!(answer, "0" | "O" | "o")
}

fn unless_skipped(session: &UserSession, node: &str) -> Option<String> {
    session
        .answer_text(node)
        .filter(|answer| !answer.is_empty() && !is_skip(answer))
        .map(str::to_string)
}

/// Assemble the registration from the answers collected so far. After the
/// first session it carries no facility or sub-specialty.
pub fn build(session: &UserSession, default_lang: &str) -> RegistrationSubmission {
    let first_name = session.answer_text(ids::FIRST_NAME).unwrap_or_default();
    let surname = session.answer_text(ids::SURNAME).unwrap_or_default();

    let mut specialties = vec![session.answer(ids::CADRE).cloned()];
    if let Some(specialty) = session.answer(ids::SELECT_SPECIALITY) {
        specialties.push(Some(specialty.clone()));
    }

    RegistrationSubmission {
        name: format!("{first_name} {surname}"),
        surname: surname.to_string(),
        specialties,
        country: "TZ".to_string(),
        facility: session.answer(ids::FACILITY_SELECT).cloned(),
        vodacom_phone: session.address.clone(),
        registration_number: unless_skipped(session, ids::REGISTRATION_NUMBER),
        cheque_number: unless_skipped(session, ids::CHEQUE_NUMBER),
        language: session
            .lang
            .clone()
            .unwrap_or_else(|| default_lang.to_string()),
    }
}
