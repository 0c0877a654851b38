use std::sync::Arc;

use uuid::Uuid;

use crate::dialogue::{Accepted, DialogueGraph, DialogueNode, NodeKind, Services, TurnContext};
use crate::error::TurnError;
use crate::lifecycle::Lifecycle;
use crate::pagination::{self, CHARACTERS_PER_PAGE, ChoiceOption, Paginator, Selection};
use crate::session::{AddressLocks, SessionStore, UserSession};

/// Where an inbound message sits in the transport's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    New,
    Resume,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundTurn {
    pub from_addr: String,
    pub content: Option<String>,
    pub event: SessionEvent,
    pub message_id: Uuid,
}

impl InboundTurn {
    pub fn new(from_addr: impl Into<String>, event: SessionEvent, content: Option<String>) -> Self {
        Self {
            from_addr: from_addr.into(),
            content,
            event,
            message_id: Uuid::new_v4(),
        }
    }

    pub fn start(from_addr: impl Into<String>) -> Self {
        Self::new(from_addr, SessionEvent::New, None)
    }

    pub fn reply(from_addr: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(from_addr, SessionEvent::Resume, Some(content.into()))
    }

    pub fn close(from_addr: impl Into<String>) -> Self {
        Self::new(from_addr, SessionEvent::Close, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// False once a terminal node has been reached.
    pub continue_session: bool,
}

/// Result of checking input against the current node.
enum Outcome {
    Accepted(Accepted),
    /// "View more" or "Back": the cursor moved, the node is shown again.
    Paged(Vec<ChoiceOption>),
    Rejected(Vec<ChoiceOption>),
}

/// Drives each sender's session through the dialogue graph, one turn at a
/// time.
pub struct Orchestrator {
    graph: Arc<DialogueGraph>,
    services: Services,
    store: Arc<dyn SessionStore>,
    lifecycle: Lifecycle,
    locks: AddressLocks,
    paginator: Paginator,
}

impl Orchestrator {
    pub fn new(graph: Arc<DialogueGraph>, services: Services, store: Arc<dyn SessionStore>) -> Self {
        Self {
            graph,
            services,
            store,
            lifecycle: Lifecycle::new(),
            locks: AddressLocks::new(),
            paginator: Paginator::default(),
        }
    }

    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Process one inbound message. Returns `None` for close events.
    ///
    /// The session is persisted before the reply is returned. On error
    /// nothing is persisted and no reply is sent, so the sender's session
    /// stays at the node it was on.
    pub async fn handle_turn(&self, turn: InboundTurn) -> Result<Option<Reply>, TurnError> {
        let _guard = self.locks.acquire(&turn.from_addr).await;
        tracing::info!(
            from = %turn.from_addr,
            message_id = %turn.message_id,
            event = ?turn.event,
            "handling turn"
        );

        let (mut session, is_new) = match self.store.load(&turn.from_addr).await? {
            Some(session) => (session, false),
            None => (UserSession::new(turn.from_addr.clone()), true),
        };

        let reply = {
            let mut ctx = TurnContext::new(&mut session, &self.services);
            if is_new {
                self.lifecycle.new_user(&mut ctx).await;
            }
            let node = self.resume_node(&mut ctx).await?;
            self.advance(&mut ctx, node, &turn).await?
        };

        session.touch();
        self.store.save(&session).await?;

        if let Some(reply) = &reply {
            tracing::info!(
                from = %turn.from_addr,
                node = session.current_node.as_deref().unwrap_or_default(),
                continue_session = reply.continue_session,
                "reply ready"
            );
        }
        Ok(reply)
    }

    /// The node the session is on. A session without one, or whose node no
    /// longer exists, enters the start node.
    async fn resume_node(&self, ctx: &mut TurnContext<'_>) -> Result<&DialogueNode, TurnError> {
        let stored = ctx.session.current_node.clone();
        if let Some(node) = stored.as_deref().and_then(|id| self.graph.get(id)) {
            return Ok(node);
        }
        if let Some(id) = stored {
            tracing::warn!(node = %id, "stored node no longer exists, restarting");
        }
        let start = self.graph.start();
        self.enter(ctx, start).await?;
        Ok(start)
    }

    async fn advance(
        &self,
        ctx: &mut TurnContext<'_>,
        node: &DialogueNode,
        turn: &InboundTurn,
    ) -> Result<Option<Reply>, TurnError> {
        match turn.event {
            SessionEvent::Close => {
                let possible_timeout = node.kind != NodeKind::Terminal;
                self.lifecycle
                    .session_closed(ctx, node.id, possible_timeout)
                    .await;
                return Ok(None);
            }
            SessionEvent::New => self.lifecycle.session_started(ctx, node.id).await,
            SessionEvent::Resume => {}
        }

        if node.kind == NodeKind::Terminal {
            let next = self.follow(ctx, node, &Accepted::none()).await?;
            if next.id != node.id {
                self.transition(ctx, node, next).await?;
            }
            return self.render(ctx, next, false).await.map(Some);
        }

        let Some(content) = turn.content.as_deref() else {
            return self.render(ctx, node, false).await.map(Some);
        };

        match self.check_input(ctx, node, content).await? {
            Outcome::Accepted(accepted) => {
                ctx.session.set_answer(node.id, accepted.value.clone());
                if node.kind == NodeKind::LanguageSelect
                    && let Some(lang) = &accepted.value
                {
                    ctx.session.lang = Some(lang.to_string());
                }
                let next = self.follow(ctx, node, &accepted).await?;
                self.transition(ctx, node, next).await?;
                self.render(ctx, next, false).await.map(Some)
            }
            Outcome::Paged(options) => Ok(Some(self.compose(ctx, node, &options, false))),
            Outcome::Rejected(options) => Ok(Some(self.compose(ctx, node, &options, true))),
        }
    }

    async fn check_input(
        &self,
        ctx: &mut TurnContext<'_>,
        node: &DialogueNode,
        content: &str,
    ) -> Result<Outcome, TurnError> {
        if !node.kind.has_choices() {
            return Ok(if self.graph.accepts(node.id, content) {
                Outcome::Accepted(Accepted::text(content))
            } else {
                tracing::debug!(node = node.id, "free text rejected");
                Outcome::Rejected(Vec::new())
            });
        }

        let options = self.options(ctx, node).await?;
        let page = self.paginator.page(&options, ctx.session.cursor(node.id));
        Ok(match page.select(content) {
            Selection::Chosen(option) => Outcome::Accepted(Accepted::choice(content, option.value)),
            Selection::More => {
                ctx.session
                    .set_cursor(node.id, self.paginator.advance(page.offset));
                Outcome::Paged(options)
            }
            Selection::Back => {
                ctx.session
                    .set_cursor(node.id, self.paginator.retreat(page.offset));
                Outcome::Paged(options)
            }
            Selection::Invalid => Outcome::Rejected(options),
        })
    }

    /// Run the node's route and check the result against its declared
    /// targets.
    async fn follow(
        &self,
        ctx: &mut TurnContext<'_>,
        node: &DialogueNode,
        accepted: &Accepted,
    ) -> Result<&DialogueNode, TurnError> {
        let next = node.route.next(ctx, accepted).await?;
        if !node.route.targets().contains(&next) {
            return Err(TurnError::UndeclaredTransition {
                from: node.id.to_string(),
                to: next.to_string(),
            });
        }
        self.graph
            .get(next)
            .ok_or_else(|| TurnError::UnknownNode(next.to_string()))
    }

    async fn transition(
        &self,
        ctx: &mut TurnContext<'_>,
        from: &DialogueNode,
        to: &DialogueNode,
    ) -> Result<(), TurnError> {
        tracing::debug!(from = from.id, to = to.id, "transition");
        self.lifecycle.node_exited(ctx, from.id);
        self.enter(ctx, to).await
    }

    async fn enter(&self, ctx: &mut TurnContext<'_>, node: &DialogueNode) -> Result<(), TurnError> {
        self.lifecycle.node_entered(ctx, node.id);
        ctx.session.set_cursor(node.id, 0);
        ctx.session.current_node = Some(node.id.to_string());
        if let Some(hook) = &node.on_enter {
            hook.on_enter(ctx).await?;
        }
        Ok(())
    }

    async fn options(
        &self,
        ctx: &TurnContext<'_>,
        node: &DialogueNode,
    ) -> Result<Vec<ChoiceOption>, TurnError> {
        match &node.choices {
            Some(source) => source.options(ctx).await,
            None => Ok(Vec::new()),
        }
    }

    async fn render(
        &self,
        ctx: &TurnContext<'_>,
        node: &DialogueNode,
        error: bool,
    ) -> Result<Reply, TurnError> {
        let options = self.options(ctx, node).await?;
        Ok(self.compose(ctx, node, &options, error))
    }

    fn compose(
        &self,
        ctx: &TurnContext<'_>,
        node: &DialogueNode,
        options: &[ChoiceOption],
        error: bool,
    ) -> Reply {
        let header = match (error, node.error) {
            (true, Some(text)) => text,
            _ => node.prompt,
        };
        let content = if node.kind.has_choices() {
            let page = self.paginator.page(options, ctx.session.cursor(node.id));
            pagination::render_page(header, &page, CHARACTERS_PER_PAGE)
        } else {
            pagination::render_text(header, CHARACTERS_PER_PAGE)
        };
        Reply {
            content,
            continue_session: node.kind != NodeKind::Terminal,
        }
    }
}
