use std::sync::Arc;

use async_trait::async_trait;

use super::TurnContext;
use crate::error::TurnError;
use crate::pagination::ChoiceOption;
use crate::value::Scalar;

pub type NodeId = &'static str;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Accepts any text that passes the node's validator.
    FreeText,
    /// Accepts a number from the rendered page of options.
    Choice,
    /// Like [`NodeKind::Choice`], and the chosen value becomes the session
    /// language.
    LanguageSelect,
    /// Ends the session. The next turn follows the route without reading
    /// its content.
    Terminal,
}

impl NodeKind {
    pub fn has_choices(self) -> bool {
        matches!(self, NodeKind::Choice | NodeKind::LanguageSelect)
    }
}

/// Input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub raw: String,
    /// The chosen option's value, or the raw text for free-text nodes.
    /// `None` for sentinel options.
    pub value: Option<Scalar>,
}

impl Accepted {
    pub fn text(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            value: Some(Scalar::Text(raw.clone())),
            raw,
        }
    }

    pub fn choice(raw: impl Into<String>, value: Option<Scalar>) -> Self {
        Self {
            raw: raw.into(),
            value,
        }
    }

    /// The turn that leaves a terminal node carries no usable input.
    pub fn none() -> Self {
        Self {
            raw: String::new(),
            value: None,
        }
    }
}

/// Transition out of a node.
#[async_trait]
pub trait Route: Send + Sync {
    /// Every node id [`Route::next`] may return.
    fn targets(&self) -> Vec<NodeId>;

    async fn next(
        &self,
        ctx: &mut TurnContext<'_>,
        accepted: &Accepted,
    ) -> Result<NodeId, TurnError>;
}

/// Options for a choice node, resolved every time the node is shown.
#[async_trait]
pub trait ChoiceSource: Send + Sync {
    async fn options(&self, ctx: &TurnContext<'_>) -> Result<Vec<ChoiceOption>, TurnError>;
}

/// Side effects of arriving at a node. Completes before the reply is built.
#[async_trait]
pub trait EntryHook: Send + Sync {
    async fn on_enter(&self, ctx: &mut TurnContext<'_>) -> Result<(), TurnError>;
}

pub struct DialogueNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub prompt: &'static str,
    /// Shown instead of the prompt after invalid input.
    pub error: Option<&'static str>,
    /// Regex free-text input must match. Compiled when the graph is built.
    pub validator: Option<&'static str>,
    pub choices: Option<Arc<dyn ChoiceSource>>,
    pub route: Arc<dyn Route>,
    pub on_enter: Option<Arc<dyn EntryHook>>,
}

impl DialogueNode {
    fn new(id: NodeId, kind: NodeKind, prompt: &'static str, route: Arc<dyn Route>) -> Self {
        Self {
            id,
            kind,
            prompt,
            error: None,
            validator: None,
            choices: None,
            route,
            on_enter: None,
        }
    }

    pub fn free_text(id: NodeId, prompt: &'static str, route: impl Route + 'static) -> Self {
        Self::new(id, NodeKind::FreeText, prompt, Arc::new(route))
    }

    pub fn choice(
        id: NodeId,
        prompt: &'static str,
        choices: impl ChoiceSource + 'static,
        route: impl Route + 'static,
    ) -> Self {
        Self::new(id, NodeKind::Choice, prompt, Arc::new(route)).with_choices(choices)
    }

    pub fn language(
        id: NodeId,
        prompt: &'static str,
        choices: impl ChoiceSource + 'static,
        route: impl Route + 'static,
    ) -> Self {
        Self::new(id, NodeKind::LanguageSelect, prompt, Arc::new(route)).with_choices(choices)
    }

    /// A node that ends the session and restarts at `restart` on the next
    /// turn.
    pub fn terminal(id: NodeId, prompt: &'static str, restart: NodeId) -> Self {
        Self::terminal_with(id, prompt, Goto(restart))
    }

    pub fn terminal_with(id: NodeId, prompt: &'static str, route: impl Route + 'static) -> Self {
        Self::new(id, NodeKind::Terminal, prompt, Arc::new(route))
    }

    pub fn with_choices(mut self, choices: impl ChoiceSource + 'static) -> Self {
        self.choices = Some(Arc::new(choices));
        self
    }

    pub fn with_validator(mut self, pattern: &'static str, error: &'static str) -> Self {
        self.validator = Some(pattern);
        self.error = Some(error);
        self
    }

    pub fn with_error(mut self, error: &'static str) -> Self {
        self.error = Some(error);
        self
    }

    pub fn on_enter(mut self, hook: impl EntryHook + 'static) -> Self {
        self.on_enter = Some(Arc::new(hook));
        self
    }
}

impl std::fmt::Debug for DialogueNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueNode")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("targets", &self.route.targets())
            .finish_non_exhaustive()
    }
}

/// Unconditional transition.
#[derive(Debug, Clone, Copy)]
pub struct Goto(pub NodeId);

#[async_trait]
impl Route for Goto {
    fn targets(&self) -> Vec<NodeId> {
        vec![self.0]
    }

    async fn next(
        &self,
        _ctx: &mut TurnContext<'_>,
        _accepted: &Accepted,
    ) -> Result<NodeId, TurnError> {
        Ok(self.0)
    }
}

/// Transition chosen by the accepted value, with a fallback.
#[derive(Debug, Clone)]
pub struct Branch {
    arms: Vec<(Scalar, NodeId)>,
    otherwise: NodeId,
}

impl Branch {
    pub fn otherwise(target: NodeId) -> Self {
        Self {
            arms: Vec::new(),
            otherwise: target,
        }
    }

    pub fn when(mut self, value: impl Into<Scalar>, target: NodeId) -> Self {
        self.arms.push((value.into(), target));
        self
    }

    pub fn pick(&self, value: Option<&Scalar>) -> NodeId {
        self.arms
            .iter()
            .find(|(arm, _)| Some(arm) == value)
            .map(|&(_, target)| target)
            .unwrap_or(self.otherwise)
    }
}

#[async_trait]
impl Route for Branch {
    fn targets(&self) -> Vec<NodeId> {
        let mut targets: Vec<NodeId> = self.arms.iter().map(|&(_, t)| t).collect();
        targets.push(self.otherwise);
        targets.dedup();
        targets
    }

    async fn next(
        &self,
        _ctx: &mut TurnContext<'_>,
        accepted: &Accepted,
    ) -> Result<NodeId, TurnError> {
        Ok(self.pick(accepted.value.as_ref()))
    }
}

/// A fixed option list.
#[derive(Debug, Clone)]
pub struct StaticChoices(pub Vec<ChoiceOption>);

impl StaticChoices {
    pub fn new<I, V>(options: I) -> Self
    where
        I: IntoIterator<Item = (V, &'static str)>,
        V: Into<Scalar>,
    {
        Self(
            options
                .into_iter()
                .map(|(value, label)| ChoiceOption::new(value, label))
                .collect(),
        )
    }
}

#[async_trait]
impl ChoiceSource for StaticChoices {
    async fn options(&self, _ctx: &TurnContext<'_>) -> Result<Vec<ChoiceOption>, TurnError> {
        Ok(self.0.clone())
    }
}
