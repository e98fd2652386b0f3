use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "implement")]
#[command(about = "Generate Python function bodies from their signatures", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding generated implementations
    #[arg(long, global = true, env = "IMPLEMENT_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Chat model used for generation
    #[arg(long, global = true, env = "IMPLEMENT_OPENAI_MODEL")]
    pub model: Option<String>,

    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the prompt artifact of one or more functions
    Extract {
        /// Python source file
        file: PathBuf,

        /// Dotted function names (`calculate`, `Outer.method`)
        #[arg(required_unless_present = "all")]
        functions: Vec<String>,

        /// Extract every top-level function in the file
        #[arg(long, conflicts_with = "functions")]
        all: bool,
    },

    /// Generate an implementation unless one is already cached
    Generate {
        file: PathBuf,

        function: String,

        /// Remove cached implementations first
        #[arg(long)]
        clean: bool,
    },

    /// Ensure an implementation exists, then call it and print the JSON result
    Call {
        file: PathBuf,

        function: String,

        /// Positional arguments as a JSON array
        #[arg(long, default_value = "[]")]
        args: String,

        /// Keyword arguments as a JSON object
        #[arg(long, default_value = "{}")]
        kwargs: String,
    },

    /// Remove every cached implementation
    Clean,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
