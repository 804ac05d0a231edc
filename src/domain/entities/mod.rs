//! Domain entities

mod deploy_state;
mod staged_tree;

pub use deploy_state::{DeployState, DeployStateMachine};
pub use staged_tree::{tree_manifest, StagedTree, ADDONS_DIR};
