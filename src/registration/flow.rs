use super::ids::*;
use super::steps::{Lookup, Milestone, Step};
use super::texts;
use crate::dialogue::{Branch, DialogueGraph, DialogueNode, Goto, GraphBuilder, StaticChoices};
use crate::error::GraphError;
use crate::lifecycle::Lifecycle;

const CHEQUE_NUMBER_PATTERN: &str = "^([0-9]{7,9}|[0Oo])$";
const REGISTRATION_NUMBER_PATTERN: &str = "^([0-9]{1,5}|[0Oo])$";

fn yes_no() -> StaticChoices {
    StaticChoices::new([("yes", texts::YES), ("no", texts::NO)])
}

/// The complete two-session registration dialogue, starting at the language
/// menu.
pub fn build_graph() -> Result<DialogueGraph, GraphError> {
    GraphBuilder::new(INTRO)
        // Session 1
        .node(
            DialogueNode::language(
                INTRO,
                texts::INTRO,
                StaticChoices::new([("sw", "Swahili"), ("en", "English")]),
                Step::LanguageGate,
            )
            .with_error(texts::INTRO_ERROR),
        )
        .node(DialogueNode::terminal(NO_VODACOM_SIM, texts::NO_VODACOM_SIM, INTRO))
        .node(DialogueNode::choice(
            CADRE,
            texts::CADRE,
            Lookup::Categories,
            Branch::otherwise(FIRST_NAME).when("other", CADRE_OTHER),
        ))
        .node(DialogueNode::free_text(
            CADRE_OTHER,
            texts::CADRE_OTHER,
            Branch::otherwise(CADRE_UNAVAILABLE).when("0", CADRE),
        ))
        .node(DialogueNode::choice(
            CADRE_UNAVAILABLE,
            texts::CADRE_UNAVAILABLE,
            StaticChoices::new([
                ("yes", texts::YES),
                ("no", texts::NO),
                ("back", texts::BACK),
            ]),
            Step::UnknownCategory,
        ))
        .node(DialogueNode::terminal(
            CADRE_UNAVAILABLE_CONTACT,
            texts::CADRE_UNAVAILABLE_CONTACT,
            INTRO,
        ))
        .node(DialogueNode::terminal(
            CADRE_UNAVAILABLE_DONT_CONTACT,
            texts::TRIED_TO_REGISTER,
            INTRO,
        ))
        .node(DialogueNode::terminal(END, texts::TRIED_TO_REGISTER, INTRO))
        .node(DialogueNode::free_text(FIRST_NAME, texts::FIRST_NAME, Goto(SURNAME)))
        .node(DialogueNode::free_text(SURNAME, texts::SURNAME, Goto(CHEQUE_NUMBER)))
        .node(
            DialogueNode::free_text(CHEQUE_NUMBER, texts::CHEQUE_NUMBER, Step::ChequeNumber)
                .with_validator(CHEQUE_NUMBER_PATTERN, texts::CHEQUE_NUMBER_ERROR),
        )
        .node(
            DialogueNode::free_text(
                REGISTRATION_NUMBER,
                texts::REGISTRATION_NUMBER,
                Goto(TERMS_AND_CONDITIONS),
            )
            .with_validator(REGISTRATION_NUMBER_PATTERN, texts::REGISTRATION_NUMBER_ERROR),
        )
        .node(DialogueNode::choice(
            DONT_MATCH_MCT,
            texts::DONT_MATCH_MCT,
            StaticChoices::new([("again", texts::ENTER_AGAIN), ("end", texts::END_SESSION)]),
            Branch::otherwise(DONT_MATCH_MCT_END).when("again", CHEQUE_NUMBER),
        ))
        .node(DialogueNode::terminal(
            DONT_MATCH_MCT_END,
            texts::DONT_MATCH_MCT_END,
            INTRO,
        ))
        .node(DialogueNode::choice(
            TERMS_AND_CONDITIONS,
            texts::TERMS_AND_CONDITIONS,
            yes_no(),
            Branch::otherwise(SESSION1_ABORT_YN).when("yes", SESSION1_END),
        ))
        .node(DialogueNode::choice(
            SESSION1_ABORT_YN,
            texts::SESSION1_ABORT_YN,
            yes_no(),
            Branch::otherwise(TERMS_AND_CONDITIONS).when("yes", SESSION1_ABORT),
        ))
        .node(
            DialogueNode::terminal(SESSION1_ABORT, texts::SESSION1_ABORT, INTRO)
                .on_enter(Milestone::Session1Abort),
        )
        .node(
            DialogueNode::terminal(SESSION1_END, texts::SESSION1_END, SESSION2_INTRO)
                .on_enter(Milestone::Session1End),
        )
        // Session 2
        .node(
            DialogueNode::free_text(SESSION2_INTRO, texts::SESSION2_INTRO, Step::DistrictLookup)
                .on_enter(Milestone::ForgetDistrictReenter),
        )
        .node(DialogueNode::choice(
            DISTRICT_SELECT,
            texts::DISTRICT_SELECT,
            Lookup::Regions,
            Step::DistrictChosen,
        ))
        .node(DialogueNode::free_text(
            DISTRICT_REENTER,
            texts::DISTRICT_REENTER,
            Step::DistrictLookup,
        ))
        .node(DialogueNode::choice(
            FACILITY_TYPE,
            texts::FACILITY_TYPE,
            Lookup::FacilityTypes,
            Goto(FACILITY_NAME),
        ))
        .node(DialogueNode::free_text(
            FACILITY_NAME,
            texts::FACILITY_NAME,
            Step::FacilityLookup,
        ))
        .node(DialogueNode::choice(
            FACILITY_SELECT,
            texts::FACILITY_SELECT,
            Lookup::Facilities,
            Step::FacilityChosen,
        ))
        .node(DialogueNode::choice(
            SELECT_SPECIALITY,
            texts::SELECT_SPECIALITY,
            Lookup::SubSpecialties,
            Goto(SESSION2_END),
        ))
        .node(
            DialogueNode::terminal_with(SESSION2_END, texts::SESSION2_END, Step::Session2Restart)
                .on_enter(Milestone::Session2End),
        )
        .build()
}

/// Lifecycle hooks with the first-timeout reminder SMS.
pub fn lifecycle() -> Lifecycle {
    Lifecycle::new().with_timeout_reminder(texts::sms::FIRST_POSSIBLE_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::AddressPolicy;
    use crate::dialogue::Services;
    use crate::directory::stub::StubSubmission;
    use crate::directory::{
        Directory, DirectoryCause, DirectoryError, DirectoryRecord, RegistrationSubmission,
        StubDirectory, SwitchboardClient, Verb,
    };
    use crate::error::TurnError;
    use crate::metrics::{InMemoryCounters, InMemoryMetrics, Metrics};
    use crate::notify::{Notifier, RecordingOutbound};
    use crate::orchestrator::{InboundTurn, Orchestrator, Reply};
    use crate::session::{InMemorySessionStore, SessionStore, UserSession, counters};
    use crate::value::Scalar;

    const ADDR: &str = "255743000001";

    /// The stub directory, optionally answering searches with a single
    /// match or failing registrations.
    struct Scripted {
        stub: Arc<StubDirectory>,
        single_match: bool,
        fail_registration: bool,
    }

    #[async_trait]
    impl Directory for Scripted {
        async fn list_categories(
            &self,
            lang: &str,
        ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
            self.stub.list_categories(lang).await
        }

        async fn list_regions(
            &self,
            lang: &str,
            query: &str,
        ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
            let mut regions = self.stub.list_regions(lang, query).await?;
            if self.single_match {
                regions.truncate(1);
            }
            Ok(regions)
        }

        async fn list_facility_types(
            &self,
            lang: &str,
        ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
            self.stub.list_facility_types(lang).await
        }

        async fn list_facilities(
            &self,
            lang: &str,
            region: Option<&Scalar>,
            facility_type: Option<&Scalar>,
            query: &str,
        ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
            let mut facilities = self
                .stub
                .list_facilities(lang, region, facility_type, query)
                .await?;
            if self.single_match {
                facilities.truncate(1);
            }
            Ok(facilities)
        }

        async fn list_sub_specialties(
            &self,
            lang: &str,
            category: &Scalar,
        ) -> Result<Vec<DirectoryRecord>, DirectoryError> {
            self.stub.list_sub_specialties(lang, category).await
        }

        async fn category_requires_sub_specialty(
            &self,
            lang: &str,
            category: &Scalar,
        ) -> Result<bool, DirectoryError> {
            self.stub.category_requires_sub_specialty(lang, category).await
        }

        async fn submit_unknown_category(
            &self,
            lang: &str,
            address: &str,
            title: &str,
        ) -> Result<Option<Scalar>, DirectoryError> {
            self.stub.submit_unknown_category(lang, address, title).await
        }

        async fn submit_unknown_facility(
            &self,
            lang: &str,
            address: &str,
            title: &str,
            region: Option<&Scalar>,
            facility_type: Option<&Scalar>,
        ) -> Result<Option<Scalar>, DirectoryError> {
            self.stub
                .submit_unknown_facility(lang, address, title, region, facility_type)
                .await
        }

        async fn submit_registration(
            &self,
            submission: &RegistrationSubmission,
        ) -> Result<Option<Scalar>, DirectoryError> {
            if self.fail_registration {
                return Err(DirectoryError::new(
                    Verb::Post,
                    "http://swb.example.org/api/health-workers",
                    DirectoryCause::HttpStatus(500),
                ));
            }
            self.stub.submit_registration(submission).await
        }
    }

    struct Harness {
        orch: Orchestrator,
        stub: Arc<StubDirectory>,
        store: Arc<InMemorySessionStore>,
        sink: Arc<InMemoryMetrics>,
        outbound: Arc<RecordingOutbound>,
    }

    #[derive(Default)]
    struct Options {
        patterns: Vec<String>,
        qa: bool,
        single_match: bool,
        fail_registration: bool,
    }

    fn harness(options: Options) -> Harness {
        let stub = Arc::new(StubDirectory::new());
        let directory = Arc::new(Scripted {
            stub: stub.clone(),
            single_match: options.single_match,
            fail_registration: options.fail_registration,
        });
        let sink = Arc::new(InMemoryMetrics::new());
        let outbound = Arc::new(RecordingOutbound::new());
        let store = Arc::new(InMemorySessionStore::new());
        let services = Services {
            directory,
            metrics: Metrics::new("default", sink.clone(), Arc::new(InMemoryCounters::new())),
            notifier: Notifier::new(
                Some(("sms_pool".into(), "10010".into())),
                outbound.clone(),
            ),
            address_policy: AddressPolicy::new(&options.patterns).unwrap(),
            qa: options.qa,
            default_lang: "en".into(),
        };
        let orch = Orchestrator::new(Arc::new(build_graph().unwrap()), services, store.clone())
            .with_lifecycle(lifecycle());
        Harness {
            orch,
            stub,
            store,
            sink,
            outbound,
        }
    }

    impl Harness {
        async fn start(&self, from: &str) -> Reply {
            self.orch
                .handle_turn(InboundTurn::start(from))
                .await
                .unwrap()
                .unwrap()
        }

        async fn say(&self, from: &str, content: &str) -> Reply {
            self.orch
                .handle_turn(InboundTurn::reply(from, content))
                .await
                .unwrap()
                .unwrap()
        }

        async fn close(&self, from: &str) {
            let reply = self.orch.handle_turn(InboundTurn::close(from)).await.unwrap();
            assert!(reply.is_none());
        }

        async fn session(&self, from: &str) -> UserSession {
            self.store.load(from).await.unwrap().unwrap()
        }

        async fn node(&self, from: &str) -> String {
            self.session(from).await.current_node.unwrap_or_default()
        }

        fn fired(&self, metric: &str) -> Vec<f64> {
            self.sink
                .series("default", metric)
                .map(|s| s.values)
                .unwrap_or_default()
        }

        /// Place a user at `node` with a finished first session.
        async fn seed(&self, from: &str, node: &str, cadre: Scalar) {
            let mut session = UserSession::new(from);
            session.current_node = Some(node.to_string());
            session.lang = Some("en".into());
            session.set_answer(CADRE, Some(cadre));
            session.set_answer(FIRST_NAME, Some("Amina".into()));
            session.set_answer(SURNAME, Some("Juma".into()));
            session.set_answer(CHEQUE_NUMBER, Some("1234567".into()));
            self.store.insert(session).await;
        }

        async fn finish_session1(&self, from: &str) -> Reply {
            self.start(from).await;
            self.say(from, "2").await;
            self.say(from, "1").await;
            self.say(from, "Amina").await;
            self.say(from, "Juma").await;
            self.say(from, "1234567").await;
            self.say(from, "1").await
        }
    }

    #[test]
    fn graph_has_no_orphans_and_reaches_every_live_node() {
        let graph = build_graph().unwrap();
        let reachable = graph.reachable_from(INTRO);
        let legacy = [END, DONT_MATCH_MCT, DONT_MATCH_MCT_END];
        for id in graph.ids() {
            assert!(
                reachable.contains(id) || legacy.contains(&id),
                "{id} is unreachable"
            );
        }
        for id in legacy {
            assert!(graph.reachable_from(id).contains(INTRO));
        }
    }

    #[tokio::test]
    async fn every_node_renders_within_budget() {
        let h = harness(Options::default());
        let graph = Arc::new(build_graph().unwrap());
        let rendered = crate::registration::render_every_node(graph.clone(), h.orch.services().clone())
            .await
            .unwrap();
        assert_eq!(rendered.len(), graph.len());
        for node in rendered {
            assert!(node.fits(), "{} renders {} chars: {}", node.id, node.chars(), node.content);
        }
    }

    #[tokio::test]
    async fn happy_path_registers_twice() {
        let h = harness(Options::default());

        let intro = h.start(ADDR).await;
        assert_eq!(
            intro.content,
            format!("{}\n1. Swahili\n2. English", texts::INTRO)
        );
        let cadre = h.say(ADDR, "2").await;
        assert_eq!(
            cadre.content,
            "What CADRE are you?\n1. Medical Specialist\n2. MO\n3. AMO\n4. CO\n5. ACO\n6. View more"
        );
        assert_eq!(h.say(ADDR, "1").await.content, texts::FIRST_NAME);
        assert_eq!(h.say(ADDR, "Amina").await.content, texts::SURNAME);
        assert_eq!(h.say(ADDR, "Juma").await.content, texts::CHEQUE_NUMBER);
        assert_eq!(h.say(ADDR, "0").await.content, texts::REGISTRATION_NUMBER);
        let terms = h.say(ADDR, "o").await;
        assert!(terms.content.starts_with(texts::TERMS_AND_CONDITIONS));

        let end1 = h.say(ADDR, "1").await;
        assert_eq!(end1.content, texts::SESSION1_END);
        assert!(!end1.continue_session);
        h.close(ADDR).await;

        let partial = h.stub.registrations();
        assert_eq!(partial.len(), 1);
        assert!(!partial[0].is_complete());
        assert_eq!(partial[0].language, "en");
        assert_eq!(partial[0].cheque_number, None);
        assert_eq!(partial[0].registration_number, None);
        let session = h.session(ADDR).await;
        assert_eq!(session.counter(counters::REGISTERED), 1);
        assert_eq!(session.counter(counters::POSSIBLE_TIMEOUTS), 0);

        // Second session.
        assert_eq!(h.start(ADDR).await.content, texts::SESSION2_INTRO);
        let districts = h.say(ADDR, "Kigoma").await;
        assert_eq!(
            districts.content,
            "The district you entered cannot be found. Did you mean:\n\
             1. Kigoma MC\n2. Kigoma DC\n3. Kasulu DC\n4. None of the above"
        );
        let types = h.say(ADDR, "2").await;
        assert!(types.content.starts_with(texts::FACILITY_TYPE));
        assert!(types.content.ends_with("6. View more"));
        assert_eq!(h.say(ADDR, "1").await.content, texts::FACILITY_NAME);
        let facilities = h.say(ADDR, "Wazazi").await;
        assert!(facilities.content.starts_with(texts::FACILITY_SELECT));
        let specialties = h.say(ADDR, "1").await;
        assert_eq!(
            specialties.content,
            "Please enter your specialty:\n1. Anaesthesia\n2. Anatomy\n3. Other"
        );
        let end2 = h.say(ADDR, "2").await;
        assert_eq!(end2.content, texts::SESSION2_END);
        assert!(!end2.continue_session);

        let registrations = h.stub.registrations();
        assert_eq!(registrations.len(), 2);
        let complete = &registrations[1];
        assert!(complete.is_complete());
        assert_eq!(complete.facility, Some(Scalar::from("wazazi-galapo")));
        assert_eq!(
            complete.specialties,
            vec![Some(Scalar::Number(1)), Some(Scalar::from("anatomy"))]
        );
        assert_eq!(complete.cheque_number, None);
        assert_eq!(complete.registration_number, None);

        assert_eq!(h.fired("first_session_completed"), vec![1.0]);
        assert_eq!(h.fired("second_session_completed"), vec![1.0]);
        assert_eq!(h.fired("sessions_taken_to_register"), vec![1.0]);
        assert_eq!(h.fired("unique_users"), vec![1.0]);
        assert_eq!(h.fired("ussd_sessions"), vec![1.0, 2.0]);
        assert_eq!(
            h.outbound.sent_to(ADDR),
            vec![texts::sms::SESSION1_END, texts::sms::SESSION2_END]
        );

        // A finished registration stays finished.
        assert_eq!(h.start(ADDR).await.content, texts::SESSION2_END);
        assert_eq!(h.stub.registrations().len(), 2);
        assert_eq!(h.fired("second_session_completed"), vec![1.0]);
    }

    #[tokio::test]
    async fn skip_sentinels_are_accepted_and_left_out() {
        let h = harness(Options::default());
        h.start(ADDR).await;
        h.say(ADDR, "2").await;
        h.say(ADDR, "3").await;
        h.say(ADDR, "Amina").await;
        h.say(ADDR, "Juma").await;

        assert_eq!(h.say(ADDR, "12").await.content, texts::CHEQUE_NUMBER_ERROR);
        assert_eq!(h.node(ADDR).await, CHEQUE_NUMBER);
        assert!(h.session(ADDR).await.answer(CHEQUE_NUMBER).is_none());

        assert_eq!(h.say(ADDR, "O").await.content, texts::REGISTRATION_NUMBER);
        assert_eq!(
            h.say(ADDR, "123456").await.content,
            texts::REGISTRATION_NUMBER_ERROR
        );
        let terms = h.say(ADDR, "o").await;
        assert!(terms.content.starts_with(texts::TERMS_AND_CONDITIONS));
        h.say(ADDR, "1").await;

        let registration = &h.stub.registrations()[0];
        assert_eq!(registration.cheque_number, None);
        assert_eq!(registration.registration_number, None);
        assert_eq!(registration.specialties, vec![Some(Scalar::Number(60))]);
    }

    #[tokio::test]
    async fn zero_cheque_number_asks_for_registration_number() {
        let h = harness(Options::default());
        h.start(ADDR).await;
        h.say(ADDR, "2").await;
        h.say(ADDR, "2").await;
        h.say(ADDR, "Amina").await;
        h.say(ADDR, "Juma").await;
        assert_eq!(h.say(ADDR, "0").await.content, texts::REGISTRATION_NUMBER);
        let terms = h.say(ADDR, "1234").await;
        assert!(terms.content.starts_with(texts::TERMS_AND_CONDITIONS));
        h.say(ADDR, "1").await;
        assert_eq!(
            h.stub.registrations()[0].registration_number.as_deref(),
            Some("1234")
        );
    }

    #[tokio::test]
    async fn first_possible_timeout_sends_one_sms() {
        let h = harness(Options::default());
        h.start(ADDR).await;
        h.say(ADDR, "2").await;
        h.close(ADDR).await;
        h.start(ADDR).await;
        h.close(ADDR).await;

        assert_eq!(
            h.outbound.sent_to(ADDR),
            vec![texts::sms::FIRST_POSSIBLE_TIMEOUT]
        );
        assert_eq!(h.session(ADDR).await.counter(counters::POSSIBLE_TIMEOUTS), 2);
        assert_eq!(h.fired("possible_timeout_in.cadre"), vec![1.0, 1.0]);
        assert_eq!(h.fired("session_closed_in.cadre"), vec![1.0, 1.0]);
    }

    #[tokio::test]
    async fn allow_list_routes_sender() {
        let h = harness(Options {
            patterns: vec!["^25574[3-6]".into(), "^2557[56]".into()],
            ..Options::default()
        });

        h.start("255711000000").await;
        let rejected = h.say("255711000000", "1").await;
        assert_eq!(rejected.content, texts::NO_VODACOM_SIM);
        assert!(!rejected.continue_session);
        assert_eq!(h.session("255711000000").await.lang.as_deref(), Some("sw"));
        // The next dial starts over at the language menu.
        assert!(h.start("255711000000").await.content.starts_with(texts::INTRO));

        h.start("255761000000").await;
        let accepted = h.say("255761000000", "2").await;
        assert!(accepted.content.starts_with(texts::CADRE));
    }

    #[tokio::test]
    async fn invalid_language_shows_error() {
        let h = harness(Options::default());
        h.start(ADDR).await;
        let reply = h.say(ADDR, "7").await;
        assert_eq!(
            reply.content,
            format!("{}\n1. Swahili\n2. English", texts::INTRO_ERROR)
        );
        assert_eq!(h.node(ADDR).await, INTRO);
    }

    #[tokio::test]
    async fn qa_rewalk_records_sessions_to_register_once() {
        let h = harness(Options {
            qa: true,
            ..Options::default()
        });
        assert_eq!(h.finish_session1(ADDR).await.content, texts::SESSION1_END);
        h.close(ADDR).await;

        // Straight to the end of session 2 with one facility match.
        h.start(ADDR).await;
        h.say(ADDR, "Kigoma").await;
        h.say(ADDR, "2").await;
        h.say(ADDR, "1").await;
        h.say(ADDR, "Wazazi").await;
        let specialties = h.say(ADDR, "1").await;
        assert!(specialties.content.starts_with(texts::SELECT_SPECIALITY));
        assert_eq!(h.say(ADDR, "1").await.content, texts::SESSION2_END);

        // QA restarts at the language menu and session 1 runs again.
        assert_eq!(h.finish_session1(ADDR).await.content, texts::SESSION1_END);
        assert_eq!(h.stub.registrations().len(), 3);
        assert_eq!(h.fired("first_session_completed"), vec![1.0, 2.0]);
        assert_eq!(h.fired("sessions_taken_to_register"), vec![1.0]);
        assert_eq!(h.session(ADDR).await.counter(counters::REGISTERED), 1);
    }

    #[tokio::test]
    async fn unlisted_cadre_can_request_contact() {
        let h = harness(Options::default());
        h.start(ADDR).await;
        h.say(ADDR, "2").await;

        let second_page = h.say(ADDR, "6").await;
        assert!(second_page.content.ends_with("5. Other\n6. Back"));
        assert_eq!(h.say(ADDR, "5").await.content, texts::CADRE_OTHER);

        // `0` goes back to the list, which starts again at the first page.
        let list = h.say(ADDR, "0").await;
        assert!(list.content.contains("1. Medical Specialist"));

        h.say(ADDR, "6").await;
        h.say(ADDR, "5").await;
        let unavailable = h.say(ADDR, "Nurse").await;
        assert!(unavailable.content.ends_with("1. Yes\n2. No\n3. Back"));

        let contact = h.say(ADDR, "1").await;
        assert_eq!(contact.content, texts::CADRE_UNAVAILABLE_CONTACT);
        assert!(!contact.continue_session);
        assert_eq!(
            h.stub.submissions(),
            vec![StubSubmission::UnknownCategory {
                address: ADDR.into(),
                title: "Nurse".into(),
                lang: "en".into(),
            }]
        );
        assert!(h.stub.registrations().is_empty());
    }

    #[tokio::test]
    async fn declining_terms_twice_aborts_with_sms() {
        let h = harness(Options::default());
        h.start(ADDR).await;
        h.say(ADDR, "2").await;
        h.say(ADDR, "2").await;
        h.say(ADDR, "Amina").await;
        h.say(ADDR, "Juma").await;
        h.say(ADDR, "1234567").await;

        let confirm = h.say(ADDR, "2").await;
        assert!(confirm.content.starts_with(texts::SESSION1_ABORT_YN));
        let terms = h.say(ADDR, "2").await;
        assert!(terms.content.starts_with(texts::TERMS_AND_CONDITIONS));
        h.say(ADDR, "2").await;
        let abort = h.say(ADDR, "1").await;
        assert_eq!(abort.content, texts::SESSION1_ABORT);
        assert_eq!(h.outbound.sent_to(ADDR), vec![texts::sms::SESSION1_ABORT]);
        assert!(h.stub.registrations().is_empty());
    }

    #[tokio::test]
    async fn district_can_be_reentered_once() {
        let h = harness(Options::default());
        h.seed(ADDR, SESSION1_END, Scalar::from("mo")).await;
        h.start(ADDR).await;
        h.say(ADDR, "Kigma").await;

        assert_eq!(h.say(ADDR, "4").await.content, texts::DISTRICT_REENTER);
        let again = h.say(ADDR, "Kasulu").await;
        assert!(again.content.starts_with(texts::DISTRICT_SELECT));
        assert_eq!(
            h.session(ADDR).await.answer_text(DISTRICT_REENTER),
            Some("Kasulu")
        );

        let types = h.say(ADDR, "4").await;
        assert!(types.content.starts_with(texts::FACILITY_TYPE));
        assert_eq!(h.session(ADDR).await.answers.get(DISTRICT_SELECT), Some(&None));
    }

    #[tokio::test]
    async fn unlisted_facility_is_recorded() {
        let h = harness(Options::default());
        h.seed(ADDR, SESSION1_END, Scalar::from("mo")).await;
        h.start(ADDR).await;
        h.say(ADDR, "Kigoma").await;
        h.say(ADDR, "3").await;
        h.say(ADDR, "3").await;
        h.say(ADDR, "Ujiji").await;

        let end = h.say(ADDR, "4").await;
        assert_eq!(end.content, texts::SESSION2_END);
        let submissions = h.stub.submissions();
        assert_eq!(
            submissions[0],
            StubSubmission::UnknownFacility {
                address: ADDR.into(),
                lang: "en".into(),
                title: "Ujiji".into(),
                region: Some(Scalar::from("kasulu-dc")),
                facility_type: Some(Scalar::from("dispensary")),
            }
        );
        let registration = &h.stub.registrations()[0];
        assert_eq!(registration.facility, None);
        assert_eq!(registration.specialties, vec![Some(Scalar::from("mo"))]);
    }

    #[tokio::test]
    async fn single_matches_skip_the_lists() {
        let h = harness(Options {
            single_match: true,
            ..Options::default()
        });
        h.seed(ADDR, SESSION1_END, Scalar::from("mo")).await;
        h.start(ADDR).await;

        let types = h.say(ADDR, "Kigoma").await;
        assert!(types.content.starts_with(texts::FACILITY_TYPE));
        h.say(ADDR, "1").await;
        let end = h.say(ADDR, "Galapo").await;
        assert_eq!(end.content, texts::SESSION2_END);

        let session = h.session(ADDR).await;
        assert_eq!(session.answer(DISTRICT_SELECT), Some(&Scalar::from("kigoma-mc")));
        assert_eq!(
            h.stub.registrations()[0].facility,
            Some(Scalar::from("wazazi-galapo"))
        );
    }

    #[tokio::test]
    async fn qa_mode_restarts_completed_registration() {
        let h = harness(Options {
            qa: true,
            ..Options::default()
        });
        h.seed(ADDR, SESSION2_END, Scalar::from("mo")).await;
        assert!(h.start(ADDR).await.content.starts_with(texts::INTRO));
        assert_eq!(h.node(ADDR).await, INTRO);
    }

    #[tokio::test]
    async fn failed_registration_keeps_user_on_terms() {
        let h = harness(Options {
            fail_registration: true,
            ..Options::default()
        });
        h.start(ADDR).await;
        h.say(ADDR, "2").await;
        h.say(ADDR, "2").await;
        h.say(ADDR, "Amina").await;
        h.say(ADDR, "Juma").await;
        h.say(ADDR, "1234567").await;

        let err = h
            .orch
            .handle_turn(InboundTurn::reply(ADDR, "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::Directory(_)));
        assert_eq!(h.node(ADDR).await, TERMS_AND_CONDITIONS);
        assert!(h.outbound.sent_to(ADDR).is_empty());
    }

    #[tokio::test]
    async fn finish_session1_helper_reaches_milestone() {
        let h = harness(Options::default());
        let reply = h.finish_session1(ADDR).await;
        assert_eq!(reply.content, texts::SESSION1_END);
        assert_eq!(h.node(ADDR).await, SESSION1_END);
    }

    #[tokio::test]
    async fn lookups_use_the_chosen_language() {
        let server = MockServer::start().await;
        for (lang, title) in [("sw", "Daktari Bingwa"), ("en", "Medical Specialist")] {
            Mock::given(method("GET"))
                .and(path("/api/specialties"))
                .and(query_param("lang", lang))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "status": 0,
                    "specialties": [{"id": 1, "title": title, "short_title": null,
                        "parent_specialty_id": null, "is_query_subspecialties": true}]
                })))
                .mount(&server)
                .await;
        }
        let client = SwitchboardClient::new(format!("{}/api/", server.uri()), None, None).unwrap();
        let services = Services {
            directory: Arc::new(client),
            metrics: Metrics::new(
                "default",
                Arc::new(InMemoryMetrics::new()),
                Arc::new(InMemoryCounters::new()),
            ),
            notifier: Notifier::new(None, Arc::new(RecordingOutbound::new())),
            address_policy: AddressPolicy::allow_all(),
            qa: false,
            default_lang: "en".into(),
        };
        let orch = Orchestrator::new(
            Arc::new(build_graph().unwrap()),
            services,
            Arc::new(InMemorySessionStore::new()),
        );

        orch.handle_turn(InboundTurn::start(ADDR)).await.unwrap();
        let cadre = orch
            .handle_turn(InboundTurn::reply(ADDR, "1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            cadre.content,
            format!("{}\n1. Daktari Bingwa\n2. {}", texts::CADRE, texts::OTHER)
        );
    }
}
