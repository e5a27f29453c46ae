//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use libwizard::{Language, LibraryType};

/// Add third-party libraries to Compiler Explorer
#[derive(Parser)]
#[command(name = "ce-lib-wizard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a library to the infra and main checkouts
    Add(AddArgs),

    /// Check how versions are tagged upstream
    ResolveVersion(ResolveVersionArgs),

    /// Work out the library type of a C or C++ repository
    DetectType(DetectTypeArgs),

    /// Find the module root and import path of a Go package
    GoModule(GoModuleArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct AddArgs {
    /// Language of the library (c, c++, rust, fortran, go)
    #[arg(long, value_name = "LANG")]
    pub lang: Language,

    /// compiler-explorer/infra checkout
    #[arg(long, value_name = "DIR")]
    pub infra: PathBuf,

    /// compiler-explorer main checkout
    #[arg(long, value_name = "DIR")]
    pub main: PathBuf,

    /// Source repository URL (C, C++, Fortran)
    #[arg(long, conflicts_with_all = ["module", "crate_name"])]
    pub url: Option<String>,

    /// Go module or package path
    #[arg(long, conflicts_with = "crate_name")]
    pub module: Option<String>,

    /// Crate name (Rust)
    #[arg(long = "crate", value_name = "NAME")]
    pub crate_name: Option<String>,

    /// Version(s) to add, comma-separated
    #[arg(long = "version", value_name = "VERSION[,VERSION...]")]
    pub versions: String,

    /// Library identifier (derived from the origin by default)
    #[arg(long)]
    pub library_id: Option<String>,

    /// Library type, skipping detection
    #[arg(long = "type", value_name = "TYPE")]
    pub library_type: Option<LibraryType>,

    /// Keep temporary clones for debugging
    #[arg(long)]
    pub keep_temp: bool,

    /// Install each version afterwards and check the destination
    #[arg(long)]
    pub install_test: bool,

    /// Do not run `make ce` before using the installer
    #[arg(long)]
    pub no_setup: bool,
}

#[derive(Args)]
pub struct ResolveVersionArgs {
    /// Repository URL
    pub origin: String,

    /// Version(s), comma-separated
    #[arg(value_name = "VERSION[,VERSION...]")]
    pub versions: String,
}

#[derive(Args)]
pub struct DetectTypeArgs {
    /// Repository URL
    pub url: String,

    /// infra checkout whose catalogue is consulted first
    #[arg(long, value_name = "DIR")]
    pub infra: Option<PathBuf>,

    /// Library identifier to look up in the catalogue
    #[arg(long)]
    pub library_id: Option<String>,

    /// Language of the library (c or c++)
    #[arg(long, value_name = "LANG", default_value = "c++")]
    pub lang: Language,

    /// Keep the temporary clone for debugging
    #[arg(long)]
    pub keep_temp: bool,
}

#[derive(Args)]
pub struct GoModuleArgs {
    /// Module or package path, e.g. google.golang.org/protobuf/proto
    pub module: String,

    /// Version, with or without the leading `v`
    pub version: String,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
