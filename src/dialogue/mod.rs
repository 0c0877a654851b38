//! The dialogue graph: nodes, the async seams they are built from
//! ([`Route`], [`ChoiceSource`], [`EntryHook`]) and the validating
//! [`GraphBuilder`].

mod context;
mod graph;
mod node;

pub use context::{Services, TurnContext};
pub use graph::{DialogueGraph, GraphBuilder};
pub use node::{
    Accepted, Branch, ChoiceSource, DialogueNode, EntryHook, Goto, NodeId, NodeKind, Route,
    StaticChoices,
};
