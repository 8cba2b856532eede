use crate::harness::{run_fork_worker, Benchmark, BenchmarkOptions};
use anyhow::{Context, Result};

/// フォーク子プロセスのエントリーポイント
///
/// 標準出力は親プロセスとの通信に使うため、ここでは何も表示しない。
pub fn execute_fork_worker(benchmark: Benchmark, options: &str) -> Result<()> {
    let options: BenchmarkOptions =
        serde_json::from_str(options).context("Invalid fork options")?;
    options.validate()?;

    run_fork_worker(benchmark, &options)?;
    Ok(())
}
