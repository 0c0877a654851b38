use std::sync::Arc;

use super::ids;
use crate::dialogue::{DialogueGraph, NodeId, NodeKind, Services};
use crate::error::TurnError;
use crate::orchestrator::{InboundTurn, Orchestrator, SessionEvent};
use crate::pagination::{self, CHARACTERS_PER_PAGE};
use crate::session::{InMemorySessionStore, UserSession};
use crate::value::Scalar;

const AUDIT_ADDRESS: &str = "audit";

/// How one node renders for a user with typical answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNode {
    pub id: NodeId,
    pub content: String,
    /// The prompt itself had to be cut to fit.
    pub truncated: bool,
}

impl RenderedNode {
    pub fn chars(&self) -> usize {
        self.content.chars().count()
    }

    pub fn fits(&self) -> bool {
        self.chars() <= CHARACTERS_PER_PAGE && !self.truncated
    }
}

fn typical_session(node: NodeId) -> UserSession {
    let mut session = UserSession::new(AUDIT_ADDRESS);
    session.current_node = Some(node.to_string());
    session.set_answer(ids::CADRE, Some(Scalar::Number(1)));
    session.set_answer(ids::FIRST_NAME, Some("Amina".into()));
    session.set_answer(ids::SURNAME, Some("Juma".into()));
    session.set_answer(ids::SESSION2_INTRO, Some("Kigoma".into()));
    session.set_answer(ids::FACILITY_NAME, Some("Wazazi".into()));
    session
}

/// Render every node of `graph` against the services' directory. Sessions
/// live in a private in-memory store.
pub async fn render_every_node(
    graph: Arc<DialogueGraph>,
    services: Services,
) -> Result<Vec<RenderedNode>, TurnError> {
    let store = Arc::new(InMemorySessionStore::new());
    let orch = Orchestrator::new(graph.clone(), services, store.clone());

    let mut rendered = Vec::with_capacity(graph.len());
    for id in graph.ids() {
        let Some(node) = graph.get(id) else {
            continue;
        };
        let content = if node.kind == NodeKind::Terminal {
            pagination::render_text(node.prompt, CHARACTERS_PER_PAGE)
        } else {
            store.insert(typical_session(id)).await;
            let turn = InboundTurn::new(AUDIT_ADDRESS, SessionEvent::Resume, None);
            match orch.handle_turn(turn).await? {
                Some(reply) => reply.content,
                None => String::new(),
            }
        };
        rendered.push(RenderedNode {
            id,
            truncated: !content.starts_with(node.prompt),
            content,
        });
    }
    Ok(rendered)
}
