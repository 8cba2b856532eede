use crate::harness::Benchmark;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reflection_bench")]
#[command(about = "Compares direct, reflective, method handle and generated adapter accessor calls")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Export the final report as JSON to this path
    #[arg(long, global = true)]
    pub json: Option<PathBuf>,

    /// Run every benchmark in this process instead of forked child processes
    #[arg(long, global = true)]
    pub in_process: bool,

    /// Suppress per-iteration progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run all registered benchmarks (default)
    Run,

    /// List registered benchmarks and the compiled-in run configuration
    List,

    /// Internal: run one fork of a benchmark and stream results as JSON Lines
    #[command(name = "fork-worker", hide = true)]
    ForkWorker {
        /// Benchmark to run
        #[arg(long, value_enum)]
        benchmark: Benchmark,

        /// Run configuration serialized as JSON
        #[arg(long)]
        options: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_runs_default() {
        let cli = Cli::try_parse_from(["reflection_bench"]).unwrap();

        assert!(cli.command.is_none());
        assert!(cli.json.is_none());
        assert!(!cli.in_process);
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "reflection_bench",
            "run",
            "--json",
            "out.json",
            "--in-process",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Commands::Run)));
        assert_eq!(cli.json, Some(PathBuf::from("out.json")));
        assert!(cli.in_process);
    }

    #[test]
    fn test_fork_worker_arguments() {
        let cli = Cli::try_parse_from([
            "reflection_bench",
            "fork-worker",
            "--benchmark",
            "method_handle",
            "--options",
            "{}",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::ForkWorker { benchmark, options }) => {
                assert_eq!(benchmark, Benchmark::MethodHandle);
                assert_eq!(options, "{}");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_benchmark_rejected() {
        let result = Cli::try_parse_from([
            "reflection_bench",
            "fork-worker",
            "--benchmark",
            "field_access",
            "--options",
            "{}",
        ]);

        assert!(result.is_err());
    }
}
