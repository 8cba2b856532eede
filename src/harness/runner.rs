//! ベンチマークランナー
//!
//! ウォームアップ反復と計測反復を回し、フォーク分離・スレッド分割・
//! fail-fast を制御して [`RunReport`] を組み立てる。

use super::fork::ForkLauncher;
use super::options::{BenchmarkOptions, TimeUnit};
use super::registry::Benchmark;
use super::report::RunReport;
use super::reporter::{Phase, RunReporter};
use super::sink::Blackhole;
use super::state::BenchmarkState;
use super::stats::Statistics;
use crate::core::{HarnessError, HarnessResult, SetupResult, ValidationError};
use std::panic;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

// 時刻取得のオーバーヘッドを抑えるため、バッチは倍々で最大この回数まで増やす
const MAX_BATCH: u64 = 1 << 16;

/// 一回の反復の結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationResult {
    /// 実行したオペレーション数
    pub ops: u64,
    /// シンクが受け取った値の個数
    pub consumed: u64,
    pub elapsed: Duration,
    /// 一回あたりの時間（設定された単位）
    pub score: f64,
}

/// 一つのワーカーが記録した反復スコア
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IterationScores {
    pub warmup: Vec<f64>,
    pub measurement: Vec<f64>,
}

impl IterationScores {
    /// スレッドごとのスコアを反復番号ごとに平均する
    pub fn average(per_thread: &[IterationScores]) -> IterationScores {
        fn column_mean(columns: Vec<&Vec<f64>>) -> Vec<f64> {
            let len = columns.iter().map(|c| c.len()).min().unwrap_or(0);
            (0..len)
                .map(|i| columns.iter().map(|c| c[i]).sum::<f64>() / columns.len() as f64)
                .collect()
        }

        IterationScores {
            warmup: column_mean(per_thread.iter().map(|s| &s.warmup).collect()),
            measurement: column_mean(per_thread.iter().map(|s| &s.measurement).collect()),
        }
    }
}

/// 反復を一回実行する
///
/// `duration` が経過するまでオペレーションをバッチで呼び続ける。
pub fn run_iteration(
    benchmark: Benchmark,
    state: &BenchmarkState,
    duration: Duration,
    unit: TimeUnit,
) -> HarnessResult<IterationResult> {
    let mut sink = Blackhole::new();
    let mut ops: u64 = 0;
    let mut batch: u64 = 1;

    let start = Instant::now();
    loop {
        benchmark
            .run_batch(state, &mut sink, batch)
            .map_err(|e| HarnessError::benchmark(benchmark.name(), e))?;
        ops += batch;

        let elapsed = start.elapsed();
        if elapsed >= duration {
            return Ok(IterationResult {
                ops,
                consumed: sink.consumed(),
                elapsed,
                score: unit.per_op(elapsed, ops),
            });
        }
        batch = (batch * 2).min(MAX_BATCH);
    }
}

/// 一つのスレッドで全反復を実行する
fn run_worker(
    benchmark: Benchmark,
    options: &BenchmarkOptions,
    state: &BenchmarkState,
    reporter: Option<&dyn RunReporter>,
) -> HarnessResult<IterationScores> {
    let unit = options.time_unit();
    let mut scores = IterationScores::default();

    for index in 1..=options.warmup_iterations() {
        let result = run_iteration(benchmark, state, options.warmup_time(), unit)?;
        if let Some(reporter) = reporter {
            reporter.iteration_completed(benchmark, Phase::Warmup, index, result.score, unit);
        }
        scores.warmup.push(result.score);
    }

    for index in 1..=options.measurement_iterations() {
        let result = run_iteration(benchmark, state, options.measurement_time(), unit)?;
        if let Some(reporter) = reporter {
            reporter.iteration_completed(benchmark, Phase::Measurement, index, result.score, unit);
        }
        scores.measurement.push(result.score);
    }

    Ok(scores)
}

fn setup_and_run<F>(
    benchmark: Benchmark,
    options: &BenchmarkOptions,
    setup: &F,
    reporter: Option<&dyn RunReporter>,
) -> HarnessResult<IterationScores>
where
    F: Fn() -> SetupResult<BenchmarkState>,
{
    let state = setup()?;
    run_worker(benchmark, options, &state, reporter)
}

/// 現在のプロセス内でフォーク一回分を実行し、計測フェーズのスコアを返す
///
/// 複数スレッドの場合、各スレッドが自分の [`BenchmarkState`] を持つ。
pub fn execute_fork(
    benchmark: Benchmark,
    options: &BenchmarkOptions,
    reporter: &dyn RunReporter,
) -> HarnessResult<Vec<f64>> {
    execute_fork_with(benchmark, options, reporter, BenchmarkState::setup)
}

/// `setup` でスレッドごとの状態を作ってフォーク一回分を実行する
fn execute_fork_with<F>(
    benchmark: Benchmark,
    options: &BenchmarkOptions,
    reporter: &dyn RunReporter,
    setup: F,
) -> HarnessResult<Vec<f64>>
where
    F: Fn() -> SetupResult<BenchmarkState> + Sync,
{
    if options.threads() <= 1 {
        return setup_and_run(benchmark, options, &setup, Some(reporter))
            .map(|scores| scores.measurement);
    }

    let results: Vec<HarnessResult<IterationScores>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..options.threads())
            .map(|_| scope.spawn(|| setup_and_run(benchmark, options, &setup, None)))
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
            .collect()
    });

    let per_thread = results.into_iter().collect::<HarnessResult<Vec<_>>>()?;
    let merged = IterationScores::average(&per_thread);
    let unit = options.time_unit();

    for (i, score) in merged.warmup.iter().enumerate() {
        reporter.iteration_completed(benchmark, Phase::Warmup, i as u32 + 1, *score, unit);
    }
    for (i, score) in merged.measurement.iter().enumerate() {
        reporter.iteration_completed(benchmark, Phase::Measurement, i as u32 + 1, *score, unit);
    }

    Ok(merged.measurement)
}

/// ベンチマークランナー
pub struct Runner<R: RunReporter> {
    options: BenchmarkOptions,
    reporter: R,
    benchmarks: Vec<Benchmark>,
    launcher: Option<ForkLauncher>,
    state: Option<BenchmarkState>,
}

impl<R: RunReporter> Runner<R> {
    /// 登録済みの全ベンチマークを対象にランナーを作成
    pub fn new(options: BenchmarkOptions, reporter: R) -> Self {
        Self {
            options,
            reporter,
            benchmarks: Benchmark::ALL.to_vec(),
            launcher: None,
            state: None,
        }
    }

    /// 対象ベンチマークを絞り込む
    pub fn with_benchmarks(mut self, benchmarks: impl IntoIterator<Item = Benchmark>) -> Self {
        self.benchmarks = benchmarks.into_iter().collect();
        self
    }

    /// フォーク用の実行ファイルを指定する（フォーク実行では必須）
    pub fn with_launcher(mut self, launcher: ForkLauncher) -> Self {
        self.launcher = Some(launcher);
        self
    }

    /// セットアップ済みの状態を各ワーカーに複製して使う（プロセス内実行のみ）
    pub fn with_state(mut self, state: BenchmarkState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn options(&self) -> &BenchmarkOptions {
        &self.options
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn benchmarks(&self) -> &[Benchmark] {
        &self.benchmarks
    }

    /// 全ベンチマークを実行する
    ///
    /// fail-on-error が有効なら最初の失敗でラン全体を中断する。
    pub fn run(&self) -> HarnessResult<RunReport> {
        self.options.validate()?;

        // フォーク実行では fork-worker を実装した実行ファイルを明示する
        let launcher = match (&self.launcher, self.options.is_forked()) {
            (Some(launcher), true) => Some(launcher),
            (None, true) => {
                return Err(ValidationError::new(
                    "forks",
                    "フォーク実行には with_launcher で実行ファイルを指定してください",
                )
                .into());
            }
            (_, false) => None,
        };
        if self.state.is_some() && self.options.is_forked() {
            return Err(ValidationError::new(
                "forks",
                "セットアップ済みの状態はプロセス内実行でのみ使えます",
            )
            .into());
        }

        info!(
            benchmarks = self.benchmarks.len(),
            forks = self.options.forks(),
            warmup_forks = self.options.warmup_forks(),
            threads = self.options.threads(),
            "benchmark run started"
        );
        if self.options.should_do_gc() {
            debug!("no garbage collector to run between iterations; should_do_gc is recorded only");
        }
        self.reporter.run_started(&self.options, &self.benchmarks);

        let mut report = RunReport::new(self.options.clone());

        for &benchmark in &self.benchmarks {
            match self.run_benchmark(benchmark, launcher) {
                Ok(statistics) => {
                    self.reporter
                        .benchmark_completed(benchmark, &statistics, self.options.time_unit());
                    report.push_success(benchmark, statistics);
                }
                Err(e) => {
                    self.reporter.benchmark_failed(benchmark, &e.to_string());
                    if self.options.fail_on_error() || e.is_fatal() {
                        error!(benchmark = benchmark.name(), "aborting run: {e}");
                        return Err(e);
                    }
                    warn!(benchmark = benchmark.name(), "benchmark failed, continuing: {e}");
                    report.push_failure(benchmark, e.to_string());
                }
            }
        }

        info!("benchmark run finished");
        Ok(report)
    }

    fn run_benchmark(
        &self,
        benchmark: Benchmark,
        launcher: Option<&ForkLauncher>,
    ) -> HarnessResult<Statistics> {
        let mut samples = Vec::new();

        match launcher {
            Some(launcher) => {
                let warmup_forks = self.options.warmup_forks();
                let total = warmup_forks + self.options.forks();

                for fork in 1..=total {
                    let warmup = fork <= warmup_forks;
                    self.reporter.fork_started(benchmark, fork, total, warmup);
                    let scores = launcher.spawn(benchmark, &self.options, &self.reporter)?;
                    if !warmup {
                        samples.extend(scores);
                    }
                }
            }
            None => {
                self.reporter.fork_started(benchmark, 1, 1, false);
                samples = match &self.state {
                    Some(state) => execute_fork_with(benchmark, &self.options, &self.reporter, || {
                        Ok(state.clone())
                    })?,
                    None => execute_fork(benchmark, &self.options, &self.reporter)?,
                };
            }
        }

        Statistics::from_samples(&samples)
            .ok_or_else(|| HarnessError::fork(benchmark.name(), "計測値がありません"))
    }
}
