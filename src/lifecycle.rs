//! Session lifecycle hooks: metric counters and the possible-timeout
//! reminder fired around turns and node transitions.

use crate::dialogue::TurnContext;
use crate::session::counters;

#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    timeout_reminder: Option<String>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// SMS sent the first time a session closes outside a terminal node.
    pub fn with_timeout_reminder(mut self, text: impl Into<String>) -> Self {
        self.timeout_reminder = Some(text.into());
        self
    }

    /// First contact from an address.
    pub async fn new_user(&self, ctx: &mut TurnContext<'_>) {
        ctx.services.metrics.incr_metric("unique_users").await;
    }

    pub async fn session_started(&self, ctx: &mut TurnContext<'_>, node: &str) {
        let metrics = &ctx.services.metrics;
        metrics.incr_metric("ussd_sessions").await;
        metrics.fire_inc(&format!("session_new_in.{node}"));
        ctx.session.increment(counters::USSD_SESSIONS);
    }

    /// A close at a non-terminal node is a possible timeout. Only the first
    /// one for an address triggers the reminder.
    pub async fn session_closed(
        &self,
        ctx: &mut TurnContext<'_>,
        node: &str,
        possible_timeout: bool,
    ) {
        let metrics = &ctx.services.metrics;
        metrics.fire_inc(&format!("session_closed_in.{node}"));
        if !possible_timeout {
            return;
        }
        metrics.fire_inc(&format!("possible_timeout_in.{node}"));
        let timeouts = ctx.session.increment(counters::POSSIBLE_TIMEOUTS);
        if timeouts <= 1
            && let Some(text) = &self.timeout_reminder
        {
            ctx.services
                .notifier
                .send_sms(&ctx.session.address, text)
                .await;
        }
    }

    pub fn node_entered(&self, ctx: &TurnContext<'_>, node: &str) {
        ctx.services.metrics.fire_inc(&format!("state_entered.{node}"));
    }

    pub fn node_exited(&self, ctx: &TurnContext<'_>, node: &str) {
        ctx.services.metrics.fire_inc(&format!("state_exited.{node}"));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::AddressPolicy;
    use crate::dialogue::Services;
    use crate::directory::StubDirectory;
    use crate::metrics::{InMemoryCounters, InMemoryMetrics, Metrics};
    use crate::notify::{Notifier, RecordingOutbound};
    use crate::session::UserSession;

    struct Fixture {
        services: Services,
        sink: Arc<InMemoryMetrics>,
        outbound: Arc<RecordingOutbound>,
    }

    fn fixture() -> Fixture {
        let sink = Arc::new(InMemoryMetrics::new());
        let outbound = Arc::new(RecordingOutbound::new());
        let services = Services {
            directory: Arc::new(StubDirectory::new()),
            metrics: Metrics::new("default", sink.clone(), Arc::new(InMemoryCounters::new())),
            notifier: Notifier::new(Some(("pool".into(), "tag".into())), outbound.clone()),
            address_policy: AddressPolicy::allow_all(),
            qa: false,
            default_lang: "en".into(),
        };
        Fixture {
            services,
            sink,
            outbound,
        }
    }

    fn sum(sink: &InMemoryMetrics, metric: &str) -> f64 {
        sink.series("default", metric)
            .map(|s| s.values.iter().sum())
            .unwrap_or(0.0)
    }

    #[tokio::test]
    async fn session_start_counts_globally_and_per_user() {
        let f = fixture();
        let mut session = UserSession::new("1234567");
        let mut ctx = TurnContext::new(&mut session, &f.services);
        let lifecycle = Lifecycle::new();

        lifecycle.session_started(&mut ctx, "cadre").await;
        lifecycle.session_started(&mut ctx, "cadre").await;

        assert_eq!(session.counter(counters::USSD_SESSIONS), 2);
        assert_eq!(sum(&f.sink, "session_new_in.cadre"), 2.0);
        assert_eq!(
            f.sink.series("default", "ussd_sessions").unwrap().values,
            vec![1.0, 2.0]
        );
    }

    #[tokio::test]
    async fn only_first_possible_timeout_sends_reminder() {
        let f = fixture();
        let lifecycle = Lifecycle::new().with_timeout_reminder("Please dial again");
        let mut session = UserSession::new("1234567");
        let mut ctx = TurnContext::new(&mut session, &f.services);

        lifecycle.session_closed(&mut ctx, "surname", true).await;
        lifecycle.session_closed(&mut ctx, "surname", true).await;
        lifecycle.session_closed(&mut ctx, "session1_end", false).await;

        assert_eq!(f.outbound.sent_to("1234567"), vec!["Please dial again"]);
        assert_eq!(session.counter(counters::POSSIBLE_TIMEOUTS), 2);
        assert_eq!(sum(&f.sink, "possible_timeout_in.surname"), 2.0);
        assert_eq!(sum(&f.sink, "session_closed_in.session1_end"), 1.0);
        assert!(f.sink.series("default", "possible_timeout_in.session1_end").is_none());
    }

    #[tokio::test]
    async fn node_transitions_fire_counters() {
        let f = fixture();
        let lifecycle = Lifecycle::new();
        let mut session = UserSession::new("1234567");
        let ctx = TurnContext::new(&mut session, &f.services);

        lifecycle.node_exited(&ctx, "intro");
        lifecycle.node_entered(&ctx, "cadre");

        assert_eq!(sum(&f.sink, "state_exited.intro"), 1.0);
        assert_eq!(sum(&f.sink, "state_entered.cadre"), 1.0);
    }
}
