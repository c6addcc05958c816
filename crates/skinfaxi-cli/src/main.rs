//! Skinfaxi Command-Line Interface
//!
//! ```text
//!        S K I N F A X I
//!   HDL-to-quantum compilation
//!
//!   "Shining-mane draws the day"
//! ```
//!
//! Reads the SystemVerilog frontend's JSON AST, lowers it to the quantum
//! dialect, optimizes to a fixpoint and optionally decomposes Toffolis into
//! Clifford+T, reporting gate and qubit savings along the way.

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{compile, version};

/// Skinfaxi - compile combinational SystemVerilog to reversible quantum circuits
#[derive(Parser)]
#[command(name = "skinfaxi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a frontend AST dump to optimized quantum IR
    Compile {
        /// Input file (JSON AST from the HDL frontend)
        #[arg(short, long)]
        input: String,

        /// Write the optimized IR here instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Decompose Toffolis into Clifford+T and re-run the fixpoint
        #[arg(long)]
        decompose: bool,

        /// Print the decoded AST before lowering
        #[arg(long)]
        emit_ast: bool,

        /// Check IR invariants after every pass
        #[arg(long)]
        verify: bool,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Compile {
            input,
            output,
            decompose,
            emit_ast,
            verify,
        } => compile::execute(&input, output.as_deref(), decompose, emit_ast, verify),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
