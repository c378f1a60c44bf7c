//! API request handlers, organized by resource.

pub mod execute;
pub mod health;
pub mod system;
pub mod workflows;

pub use execute::{cancel_workflow, execute_workflow, resume_workflow};
pub use health::health;
pub use system::{system_info, validate_workflow};
pub use workflows::{create_workflow, delete_workflow, get_workflow, list_workflows};
