//! The health-worker registration dialogue.
//!
//! Registration spans two USSD sessions. The first collects the cadre, name
//! and verification numbers and ends at the `session1_end` milestone. The
//! second collects the district, facility and, for some cadres, a
//! sub-specialty, and ends at `session2_end`.

pub mod audit;
mod flow;
mod steps;
pub mod submission;
pub mod texts;

pub use audit::{RenderedNode, render_every_node};
pub use flow::{build_graph, lifecycle};
pub use steps::{Lookup, Milestone, Step};

/// Node ids. These are persisted in session records, so renaming one strands
/// users on it until they restart.
pub mod ids {
    use crate::dialogue::NodeId;

    pub const INTRO: NodeId = "intro";
    pub const NO_VODACOM_SIM: NodeId = "no_vodacom_sim";
    pub const CADRE: NodeId = "cadre";
    pub const CADRE_OTHER: NodeId = "cadre_other";
    pub const CADRE_UNAVAILABLE: NodeId = "cadre_unavailable";
    pub const CADRE_UNAVAILABLE_CONTACT: NodeId = "cadre_unavailable_contact";
    pub const CADRE_UNAVAILABLE_DONT_CONTACT: NodeId = "cadre_unavailable_dont_contact";
    /// Kept for users whose sessions ended there.
    pub const END: NodeId = "end";
    pub const FIRST_NAME: NodeId = "first_name";
    pub const SURNAME: NodeId = "surname";
    pub const CHEQUE_NUMBER: NodeId = "cheque_number";
    pub const REGISTRATION_NUMBER: NodeId = "registration_number";
    pub const DONT_MATCH_MCT: NodeId = "dont_match_mct";
    pub const DONT_MATCH_MCT_END: NodeId = "dont_match_mct_end";
    pub const TERMS_AND_CONDITIONS: NodeId = "terms_and_conditions";
    pub const SESSION1_ABORT_YN: NodeId = "session1_abort_yn";
    pub const SESSION1_ABORT: NodeId = "session1_abort";
    pub const SESSION1_END: NodeId = "session1_end";

    pub const SESSION2_INTRO: NodeId = "session2_intro";
    pub const DISTRICT_SELECT: NodeId = "district_select";
    pub const DISTRICT_REENTER: NodeId = "district_reenter";
    pub const FACILITY_TYPE: NodeId = "facility_type";
    pub const FACILITY_NAME: NodeId = "facility_name";
    pub const FACILITY_SELECT: NodeId = "facility_select";
    pub const SELECT_SPECIALITY: NodeId = "select_speciality";
    pub const SESSION2_END: NodeId = "session2_end";
}
