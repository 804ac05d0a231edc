//! External tools behind the collaborator ports

mod cargo;
mod packer;
mod program;

pub use cargo::CargoCompiler;
pub use packer::{expand_template, CommandPacker};
pub use program::{CommandDatastoreReset, ProgramLogViewer};
