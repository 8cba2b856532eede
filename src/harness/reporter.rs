// 計測進捗の報告
// コンソール出力と何もしない実装を提供

use super::options::{BenchmarkOptions, TimeUnit};
use super::registry::Benchmark;
use super::stats::Statistics;
use mockall::automock;
use serde::{Deserialize, Serialize};

/// 反復のフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Warmup,
    Measurement,
}

/// 計測進捗の報告トレイト
#[automock]
pub trait RunReporter: Send + Sync {
    /// ラン開始時の報告
    fn run_started(&self, options: &BenchmarkOptions, benchmarks: &[Benchmark]);

    /// フォーク開始時の報告（`fork` は 1 始まり）
    fn fork_started(&self, benchmark: Benchmark, fork: u32, total: u32, warmup: bool);

    /// 一回の反復が完了した時の報告
    fn iteration_completed(
        &self,
        benchmark: Benchmark,
        phase: Phase,
        index: u32,
        score: f64,
        unit: TimeUnit,
    );

    /// ベンチマーク完了時の報告
    fn benchmark_completed(&self, benchmark: Benchmark, statistics: &Statistics, unit: TimeUnit);

    /// ベンチマーク失敗時の報告
    fn benchmark_failed(&self, benchmark: Benchmark, error: &str);
}

/// コンソール出力による進捗報告実装
#[derive(Debug, Default, Clone)]
pub struct ConsoleRunReporter {
    quiet: bool,
}

impl ConsoleRunReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl RunReporter for ConsoleRunReporter {
    fn run_started(&self, options: &BenchmarkOptions, benchmarks: &[Benchmark]) {
        if self.quiet {
            return;
        }
        println!("🚀 {} benchmarks, mode {}", benchmarks.len(), options.mode().short_label());
        println!(
            "# Warmup: {} iterations, {:?} each",
            options.warmup_iterations(),
            options.warmup_time()
        );
        println!(
            "# Measurement: {} iterations, {:?} each",
            options.measurement_iterations(),
            options.measurement_time()
        );
        println!("# Threads: {} thread(s)", options.threads());
        println!(
            "# Forks: {} (+{} warmup)",
            options.forks(),
            options.warmup_forks()
        );
        println!("# Estimated run time: {:?}", options.estimated_duration() * benchmarks.len() as u32);
    }

    fn fork_started(&self, benchmark: Benchmark, fork: u32, total: u32, warmup: bool) {
        if self.quiet {
            return;
        }
        println!();
        println!("# Benchmark: {}", benchmark.qualified_name());
        let kind = if warmup { "Warmup Fork" } else { "Fork" };
        println!("# {kind}: {fork} of {total}");
    }

    fn iteration_completed(
        &self,
        _benchmark: Benchmark,
        phase: Phase,
        index: u32,
        score: f64,
        unit: TimeUnit,
    ) {
        if self.quiet {
            return;
        }
        match phase {
            Phase::Warmup => println!("# Warmup Iteration {index:>3}: {score:.3} {unit}"),
            Phase::Measurement => println!("Iteration {index:>3}: {score:.3} {unit}"),
        }
    }

    fn benchmark_completed(&self, benchmark: Benchmark, statistics: &Statistics, unit: TimeUnit) {
        if self.quiet {
            return;
        }
        println!();
        println!("✅ Result \"{}\":", benchmark.qualified_name());
        println!("  {}", format_score(statistics, unit));
        if statistics.count > 1 {
            let (low, high) = statistics.confidence_interval();
            println!(
                "  (min, avg, max) = ({:.3}, {:.3}, {:.3}), stdev = {:.3}",
                statistics.min, statistics.mean, statistics.max, statistics.stddev
            );
            println!("  CI (99.9%): [{low:.3}, {high:.3}]");
        }
    }

    fn benchmark_failed(&self, benchmark: Benchmark, error: &str) {
        if !self.quiet {
            eprintln!("❌ {} failed: {error}", benchmark.qualified_name());
        }
    }
}

/// 平均値と誤差を一行にまとめる（誤差が求まらない場合は平均値のみ）
pub fn format_score(statistics: &Statistics, unit: TimeUnit) -> String {
    if statistics.error.is_nan() {
        format!("{:.3} {unit} [Average]", statistics.mean)
    } else {
        format!(
            "{:.3} ±(99.9%) {:.3} {unit} [Average]",
            statistics.mean, statistics.error
        )
    }
}

/// 何もしない進捗報告実装（テスト・フォーク内部用）
#[derive(Debug, Default, Clone)]
pub struct NoOpRunReporter;

impl NoOpRunReporter {
    pub fn new() -> Self {
        Self
    }
}

impl RunReporter for NoOpRunReporter {
    fn run_started(&self, _options: &BenchmarkOptions, _benchmarks: &[Benchmark]) {
        // 何もしない
    }

    fn fork_started(&self, _benchmark: Benchmark, _fork: u32, _total: u32, _warmup: bool) {
        // 何もしない
    }

    fn iteration_completed(
        &self,
        _benchmark: Benchmark,
        _phase: Phase,
        _index: u32,
        _score: f64,
        _unit: TimeUnit,
    ) {
        // 何もしない
    }

    fn benchmark_completed(&self, _benchmark: Benchmark, _statistics: &Statistics, _unit: TimeUnit) {
        // 何もしない
    }

    fn benchmark_failed(&self, _benchmark: Benchmark, _error: &str) {
        // 何もしない
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_run_reporter() {
        // 出力キャプチャは複雑なため、基本的な呼び出しテストのみ
        let reporter = ConsoleRunReporter::quiet();
        let stats = Statistics::from_samples(&[1.0, 2.0]).unwrap();

        reporter.run_started(&BenchmarkOptions::default(), &Benchmark::ALL);
        reporter.fork_started(Benchmark::Reflection, 1, 2, true);
        reporter.iteration_completed(Benchmark::Reflection, Phase::Warmup, 1, 3.5, TimeUnit::Nanoseconds);
        reporter.benchmark_completed(Benchmark::Reflection, &stats, TimeUnit::Nanoseconds);
        reporter.benchmark_failed(Benchmark::Reflection, "test error");
    }

    #[test]
    fn test_format_score_single_sample_has_no_error() {
        let stats = Statistics::from_samples(&[2.5]).unwrap();
        let line = format_score(&stats, TimeUnit::Nanoseconds);

        assert_eq!(line, "2.500 ns/op [Average]");
        assert!(!line.contains("NaN"));
    }

    #[test]
    fn test_format_score_with_error() {
        let stats = Statistics::from_samples(&[1.0, 1.0, 1.0]).unwrap();
        let line = format_score(&stats, TimeUnit::Nanoseconds);

        assert_eq!(line, "1.000 ±(99.9%) 0.000 ns/op [Average]");
    }

    #[test]
    fn test_console_run_reporter_creation() {
        assert!(!ConsoleRunReporter::new().quiet);
        assert!(ConsoleRunReporter::quiet().quiet);
    }

    #[test]
    fn test_noop_run_reporter() {
        let reporter = NoOpRunReporter::new();
        let stats = Statistics::from_samples(&[1.0]).unwrap();

        // 全てのメソッドを呼び出してもパニックしない
        reporter.run_started(&BenchmarkOptions::default(), &Benchmark::ALL);
        reporter.fork_started(Benchmark::DirectAccess, 1, 1, false);
        reporter.iteration_completed(Benchmark::DirectAccess, Phase::Measurement, 1, 0.5, TimeUnit::Nanoseconds);
        reporter.benchmark_completed(Benchmark::DirectAccess, &stats, TimeUnit::Nanoseconds);
        reporter.benchmark_failed(Benchmark::DirectAccess, "test error");
    }
}
