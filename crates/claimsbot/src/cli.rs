use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "claimsbot", about = "Claims question-answering agent CLI")]
pub struct Cli {
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask a single question and print the answer.
    Ask {
        question: String,
    },
    /// Interactive chat over stdin.
    Chat,
    /// Write the synthetic sample dataset.
    Generate {
        #[arg(long, default_value_t = claims_core::DEFAULT_SAMPLE_ROWS)]
        rows: usize,
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Print dashboard KPIs for the loaded dataset.
    Stats,
}
