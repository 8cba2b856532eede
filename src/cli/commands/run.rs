use crate::harness::{BenchmarkOptions, ConsoleRunReporter, ForkLauncher, Runner};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

/// 登録済みの全ベンチマークを実行し、結果表を表示する
pub fn execute_run(json: Option<PathBuf>, in_process: bool, quiet: bool) -> Result<()> {
    let mut options = BenchmarkOptions::default();
    if in_process {
        options = options.in_process();
    }

    let reporter = if quiet {
        ConsoleRunReporter::quiet()
    } else {
        ConsoleRunReporter::new()
    };

    // フォークはこのバイナリ自身の fork-worker サブコマンドで実行する
    let mut runner = Runner::new(options, reporter);
    if runner.options().is_forked() {
        runner = runner.with_launcher(ForkLauncher::current_exe()?);
    }

    let report = match runner.run() {
        Ok(report) => report,
        Err(error) => {
            if let Some(suggestion) = error.context().suggestion {
                eprintln!("💡 {suggestion}");
            }
            return Err(error.into());
        }
    };

    report.print_summary();

    if let Some(path) = json {
        report
            .export_json_report(&path)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        info!(path = %path.display(), "report exported");
        println!("📄 結果は {} に保存されました", path.display());
    }

    Ok(())
}
