use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use modship::{Arch, BuildTarget, Os, Profile};

/// modship - build and deploy the server extension and its addons
#[derive(Parser, Debug)]
#[command(name = "modship")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit NDJSON events instead of progress lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to modship.toml in the project root)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Color output
    #[arg(long, value_enum, default_value_t = ColorWhen::Auto, global = true)]
    pub color: ColorWhen,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile the extension and stage the mod tree
    Build(TargetArgs),

    /// Build, deploy, restart the server and follow its logs
    Run(TargetArgs),
}

#[derive(Args, Debug, Clone, Copy)]
pub struct TargetArgs {
    /// Build the 32-bit extension
    #[arg(short = 'x', long = "use-x32")]
    pub use_x32: bool,

    /// Server operating system
    #[arg(short, long, value_enum, default_value_t = Os::Windows)]
    pub target: Os,

    /// Build with the release profile
    #[arg(long)]
    pub release: bool,
}

impl TargetArgs {
    pub fn build_target(&self) -> BuildTarget {
        BuildTarget::new(
            self.target,
            Arch::from_use_x32(self.use_x32),
            Profile::from_release_flag(self.release),
        )
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}
