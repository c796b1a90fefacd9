use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "arbor",
    about = "Arbor: build and inspect content-addressed tree objects",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Repository root holding `objects/` and `arbor.toml`
    #[arg(long, global = true, default_value = ".")]
    pub repo: PathBuf,

    /// Store configuration file (defaults to `<repo>/arbor.toml`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty object store
    Init(InitArgs),
    /// Build a tree from `ls-tree` formatted lines
    Mktree(MktreeArgs),
    /// List the entries of a tree
    LsTree(LsTreeArgs),
    /// Show summary information about a stored tree
    CatTree(CatTreeArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// zstd level for loose objects
    #[arg(long)]
    pub compression_level: Option<i32>,
    /// fsync object files before making them visible
    #[arg(long)]
    pub fsync: bool,
}

#[derive(Args)]
pub struct MktreeArgs {
    /// Read entries from this file instead of stdin
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct LsTreeArgs {
    /// Tree to list
    pub tree: String,
    /// Recurse into subtrees
    #[arg(short = 'r', long)]
    pub recursive: bool,
}

#[derive(Args)]
pub struct CatTreeArgs {
    /// Tree to describe
    pub tree: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn every_argument_is_documented() {
        let cmd = Cli::command();
        cmd.clone().debug_assert();
        let mut commands = vec![&cmd];
        commands.extend(cmd.get_subcommands());
        for sub in commands {
            for arg in sub.get_arguments() {
                if matches!(arg.get_id().as_str(), "help" | "version") {
                    continue;
                }
                assert!(
                    arg.get_help().is_some(),
                    "`{}` has no help for --{}",
                    sub.get_name(),
                    arg.get_id()
                );
            }
        }
    }
}
