use clap::{Parser, Subcommand};

use self::{analyze::AnalyzeArg, eval::EvalArg, train::TrainArg};

mod analyze;
mod eval;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train policies for the experiments in a config file
    Train(#[clap(flatten)] TrainArg),
    /// Aggregate training records across seeds
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Roll out a trained policy artifact
    Eval(#[clap(flatten)] EvalArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Eval(arg) => eval::run(&arg)?,
    }
    Ok(())
}
