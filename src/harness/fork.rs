//! フォーク分離
//!
//! 各フォークは同じ実行ファイルを隠しサブコマンド `fork-worker` で起動した子プロセス。
//! 子プロセスは反復ごとのスコアを JSON Lines で標準出力に書き、
//! 親プロセスはそれを読み取って進捗報告と集計に回す。

use super::options::{BenchmarkOptions, TimeUnit};
use super::registry::Benchmark;
use super::reporter::{Phase, RunReporter};
use super::runner::execute_fork;
use super::stats::Statistics;
use crate::core::{HarnessError, HarnessResult, InvocationError, SetupError};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, error};

/// 子プロセスを起動する隠しサブコマンド名
pub const FORK_WORKER_COMMAND: &str = "fork-worker";

/// 子プロセスから親プロセスへ送るイベント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ForkEvent {
    Iteration { phase: Phase, index: u32, score: f64 },
    Completed,
    Failed { failure: ForkFailure },
}

/// 子プロセス内で発生した失敗
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForkFailure {
    Setup(SetupError),
    Invocation(InvocationError),
    Other(String),
}

impl ForkFailure {
    fn from_error(error: &HarnessError) -> Self {
        match error {
            HarnessError::Setup { source } => Self::Setup(source.clone()),
            HarnessError::Benchmark { source, .. } => Self::Invocation(source.clone()),
            other => Self::Other(other.to_string()),
        }
    }

    fn into_error(self, benchmark: Benchmark) -> HarnessError {
        match self {
            Self::Setup(source) => HarnessError::Setup { source },
            Self::Invocation(source) => HarnessError::benchmark(benchmark.name(), source),
            Self::Other(message) => HarnessError::fork(benchmark.name(), message),
        }
    }
}

/// 反復結果を JSON Lines で標準出力に書く報告実装（子プロセス用）
#[derive(Debug, Default, Clone)]
pub struct JsonLinesReporter;

impl JsonLinesReporter {
    fn emit(&self, event: &ForkEvent) {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => error!("failed to encode fork event: {e}"),
        }
    }
}

impl RunReporter for JsonLinesReporter {
    fn run_started(&self, _options: &BenchmarkOptions, _benchmarks: &[Benchmark]) {}

    fn fork_started(&self, _benchmark: Benchmark, _fork: u32, _total: u32, _warmup: bool) {}

    fn iteration_completed(
        &self,
        _benchmark: Benchmark,
        phase: Phase,
        index: u32,
        score: f64,
        _unit: TimeUnit,
    ) {
        self.emit(&ForkEvent::Iteration {
            phase,
            index,
            score,
        });
    }

    fn benchmark_completed(&self, _benchmark: Benchmark, _statistics: &Statistics, _unit: TimeUnit) {}

    fn benchmark_failed(&self, _benchmark: Benchmark, _error: &str) {}
}

/// 子プロセス側のエントリーポイント
///
/// 失敗時は `Failed` イベントを書いてからエラーを返す。
pub fn run_fork_worker(benchmark: Benchmark, options: &BenchmarkOptions) -> HarnessResult<()> {
    let reporter = JsonLinesReporter;

    match execute_fork(benchmark, options, &reporter) {
        Ok(_) => {
            reporter.emit(&ForkEvent::Completed);
            Ok(())
        }
        Err(e) => {
            reporter.emit(&ForkEvent::Failed {
                failure: ForkFailure::from_error(&e),
            });
            Err(e)
        }
    }
}

/// フォークを起動する実行ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkLauncher {
    program: PathBuf,
}

impl ForkLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// 現在の実行ファイルを子プロセスとして起動する
    pub fn current_exe() -> HarnessResult<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// フォークを一つ実行し、計測フェーズのスコアを返す
    pub fn spawn(
        &self,
        benchmark: Benchmark,
        options: &BenchmarkOptions,
        reporter: &dyn RunReporter,
    ) -> HarnessResult<Vec<f64>> {
        let options_json = serde_json::to_string(options)?;

        debug!(
            program = %self.program.display(),
            benchmark = benchmark.name(),
            "spawning fork"
        );

        let mut child = Command::new(&self.program)
            .arg(FORK_WORKER_COMMAND)
            .arg("--benchmark")
            .arg(benchmark.name())
            .arg("--options")
            .arg(options_json)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HarnessError::fork(benchmark.name(), "子プロセスの標準出力を取得できません"))?;

        let unit = options.time_unit();
        let mut measurement = Vec::new();
        let mut completed = false;
        let mut failure = None;

        for line in BufReader::new(stdout).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let event: ForkEvent = match serde_json::from_str(&line) {
                Ok(event) => event,
                Err(e) => {
                    // 子プロセスが想定外の出力をした場合は終了を待ってから失敗させる
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(HarnessError::fork(
                        benchmark.name(),
                        format!("不正なフォーク出力: {line:?} ({e})"),
                    ));
                }
            };

            match event {
                ForkEvent::Iteration {
                    phase,
                    index,
                    score,
                } => {
                    reporter.iteration_completed(benchmark, phase, index, score, unit);
                    if phase == Phase::Measurement {
                        measurement.push(score);
                    }
                }
                ForkEvent::Completed => completed = true,
                ForkEvent::Failed { failure: f } => failure = Some(f),
            }
        }

        let status = child.wait()?;

        if let Some(failure) = failure {
            return Err(failure.into_error(benchmark));
        }
        if !status.success() || !completed {
            return Err(HarnessError::fork(
                benchmark.name(),
                format!("子プロセスが異常終了しました: {status}"),
            ));
        }

        Ok(measurement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fork_event_encoding() {
        let event = ForkEvent::Iteration {
            phase: Phase::Measurement,
            index: 3,
            score: 1.25,
        };
        let json = serde_json::to_string(&event).unwrap();

        assert!(json.contains("\"event\":\"iteration\""));
        assert!(json.contains("\"phase\":\"measurement\""));
        assert_eq!(serde_json::from_str::<ForkEvent>(&json).unwrap(), event);
    }

    #[test]
    fn test_fork_failure_preserves_invocation_error() {
        let error = HarnessError::benchmark(
            "reflection",
            InvocationError::invocation_target("name", "boom"),
        );
        let failure = ForkFailure::from_error(&error);
        let json = serde_json::to_string(&ForkEvent::Failed { failure }).unwrap();

        let ForkEvent::Failed { failure } = serde_json::from_str::<ForkEvent>(&json).unwrap() else {
            panic!("failed event expected");
        };
        let restored = failure.into_error(Benchmark::Reflection);

        assert!(matches!(
            restored,
            HarnessError::Benchmark {
                source: InvocationError::InvocationTarget { .. },
                ..
            }
        ));
        assert!(!restored.is_fatal());
    }

    #[test]
    fn test_fork_failure_setup_is_fatal() {
        let error: HarnessError = SetupError::method_not_found("Student", "nickname").into();
        let restored = ForkFailure::from_error(&error).into_error(Benchmark::DirectAccess);

        assert!(restored.is_fatal());
    }

    #[test]
    fn test_spawn_missing_program() {
        let launcher = ForkLauncher::new("/nonexistent/reflection_bench");
        let options = BenchmarkOptions::default();
        let reporter = crate::harness::reporter::NoOpRunReporter::new();

        let result = launcher.spawn(Benchmark::DirectAccess, &options, &reporter);
        assert!(matches!(result, Err(HarnessError::Io { .. })));
    }
}
