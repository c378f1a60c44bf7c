//! Push-dataflow graph execution core.
//!
//! A workflow is a [`model::GraphDefinition`]: typed nodes connected by
//! edges, each edge carrying a [`model::EdgeBehavior`] that decides whether
//! it fires given the source node's outcome. Execution is push-based rather
//! than superstep-based: a node runs as soon as every inbox it is waiting on
//! (per its [`node::WaitStrategy`]) has received a delivery, and its
//! completion immediately pushes [`model::Delivery`] values onto the inboxes
//! of its successors. [`executor::GraphExecutor`] drives this from an
//! initial seed through to quiescence, recording every node result through a
//! [`flow_store::RunStore`] so a crashed run can rehydrate and continue
//! rather than restart from scratch.
//!
//! Node behavior itself is pluggable: [`registry::NodeRegistry`] maps a
//! node's `type` string to a constructor closure, so concrete node
//! implementations (shell commands, agents, merges, ...) live outside this
//! crate and are registered into it at startup.

pub mod error;
pub mod events;
pub mod executor;
pub mod model;
pub mod node;
pub mod registry;
pub mod validator;

pub use error::{GraphError, Result};
pub use events::{Event, EventBus, EventNodeStatus, LogStream};
pub use executor::{GraphExecutor, RunOutcome};
pub use model::{
    Delivery, EdgeBehavior, EdgeDef, GraphDefinition, Inbox, NodeDef, NodeStatus, RunError,
    RunStatus, Secrets, CONFIG_HANDLES, CONFIG_NODE_TYPES, TRIGGER_NODE_TYPES,
};
pub use node::{
    ExecutionMode, Node, NodeContext, NodeConstructor, NodePayload, ValidationIssue,
    ValidationLevel, ValidationOutcome, WaitStrategy,
};
pub use registry::{NodeRegistry, PluginManifest, RegisteredNodeInfo};
pub use validator::{filter_executable, validate_graph, validate_workflow, GraphValidation, NodeValidationState};
