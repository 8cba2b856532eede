use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use reflection_bench::cli::{execute_fork_worker, execute_list, execute_run, Cli, Commands};

fn main() {
    // 診断ログは標準エラーへ（標準出力は結果表とフォーク通信に使う）
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(error) = run(Cli::parse()) {
        eprintln!("❌ エラー: {error:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None | Some(Commands::Run) => execute_run(cli.json, cli.in_process, cli.quiet),
        Some(Commands::List) => {
            execute_list();
            Ok(())
        }
        Some(Commands::ForkWorker { benchmark, options }) => {
            execute_fork_worker(benchmark, &options)
        }
    }
}
