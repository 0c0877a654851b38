//! User-facing text of the registration dialogue.

pub const INTRO: &str = "Welcome to the Health Network. FREE calls brought to U by Switchboard, \
Ministry of Health, MAT and Vodacom.\nPlease choose a language";
pub const INTRO_ERROR: &str = "Please select a valid language.";

pub const NO_VODACOM_SIM: &str = "Sorry. This service is only available to Health Practitioners \
with a Vodacom Sim card. Please register a new Vodacom SIM and then redial this number.";

pub const CADRE: &str = "What CADRE are you?";
pub const CADRE_OTHER: &str =
    "Please write the name of your CADRE or enter '0' to return to the list of CADRES:";
pub const CADRE_UNAVAILABLE: &str = "Sorry, this service is not yet available for your CADRE. \
Would you like us to contact you when this service becomes available for you?";
pub const CADRE_UNAVAILABLE_CONTACT: &str = "Thank you for trying to register, we will contact \
you when the programme is available for your cadre.";
pub const TRIED_TO_REGISTER: &str = "Thank you for trying to register.";

pub const FIRST_NAME: &str = "Please enter your first name.";
pub const SURNAME: &str = "Please enter your surname.";

pub const CHEQUE_NUMBER: &str = "To verify U are a government worker enter last 7-9 digits of \
your cheque no (eg 1234567). Enter '0' if U do not have a cheque no or are not a government \
worker";
pub const CHEQUE_NUMBER_ERROR: &str = "Sorry but that is not a valid cheque number. Please try \
again or enter '0' if you do not have a cheque number.";

pub const REGISTRATION_NUMBER: &str = "To verify U are a registered health worker enter your \
Medical Council of Tanganyika REGISTRATION # (eg 1234). Enter '0' if U do not have a \
Registration Number";
pub const REGISTRATION_NUMBER_ERROR: &str = "Sorry but that is not a valid Registration Number. \
Please try again or enter 0 if you do not have a registration number.";

pub const DONT_MATCH_MCT: &str =
    "Sorry but the registration number that you entered does not match with MCT records.";
pub const DONT_MATCH_MCT_END: &str = "Sorry but we cannot verify you at this point. Please \
verify your details with MCT and dial *149*24# again to register.";

pub const TERMS_AND_CONDITIONS: &str = "Do you agree to the terms and conditions as laid out at \
http://www.healthnetwork.or.tz ? Your local DMO will also have a copy.";
pub const SESSION1_ABORT_YN: &str = "We are sorry but you cannot be registered unless you agree \
to the terms and conditions. Are you sure you would like to end the registration process?";
pub const SESSION1_ABORT: &str =
    "If you would like to register at a later date please dial *149*24#.";
pub const SESSION1_END: &str = "Thank you. You have almost completed your registration process. \
Please dial *149*24# again to complete just a few more questions.";

pub const SESSION2_INTRO: &str = "Welcome back 2 the Health Network brought 2 U by Switchboard, \
Ministry of Health, MAT and Vodacom.\n\nPlease enter Ur district (eg Kilosa). No abbreviations \
please.";
pub const DISTRICT_SELECT: &str = "The district you entered cannot be found. Did you mean:";
pub const DISTRICT_REENTER: &str = "Please re-enter your district:";
pub const FACILITY_TYPE: &str = "Please enter your facility type:";
pub const FACILITY_NAME: &str =
    "Please enter the official name of the facility where you primarily practice";
pub const FACILITY_SELECT: &str = "The Facility you entered cannot be found. Did you mean:";
pub const SELECT_SPECIALITY: &str = "Please enter your specialty:";
pub const SESSION2_END: &str = "Thank you for registering with The Health Network Programme. We \
will verify your registration within 2 weeks and confirm by SMS when you can make free calls.";

pub const YES: &str = "Yes";
pub const NO: &str = "No";
pub const BACK: &str = "Back";
pub const OTHER: &str = "Other";
pub const NONE_OF_THE_ABOVE: &str = "None of the above";
pub const ENTER_AGAIN: &str = "Enter details again";
pub const END_SESSION: &str = "End Session";

pub mod sms {
    pub const SESSION1_ABORT: &str = super::SESSION1_ABORT;
    pub const SESSION1_END: &str = "Thank you for beginning your registration process. Please \
dial *149*24# again to complete your registration in a few easy steps.";
    pub const SESSION2_END: &str = super::SESSION2_END;
    pub const FIRST_POSSIBLE_TIMEOUT: &str = "Your session has ended but you have not completed \
your registration. Please dial *149*24# again to continue with your registration where you \
left off.";
}
