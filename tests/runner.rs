// ランナーのプロセス内実行とフォーク実行
mod fixtures;

use fixtures::{binary_path, quick_forked_options, quick_options};
use reflection_bench::core::{HarnessError, InvocationError};
use reflection_bench::harness::{
    Benchmark, BenchmarkOptions, BenchmarkState, ForkLauncher, NoOpRunReporter, Phase,
    RunReporter, Runner, Statistics, TimeUnit,
};
use reflection_bench::subject::StudentNameFunction;
#[cfg(unix)]
use std::path::{Path, PathBuf};
use std::sync::Mutex;
#[cfg(unix)]
use std::sync::OnceLock;
use tempfile::TempDir;

/// 報告された反復を記録する
#[derive(Default)]
struct RecordingReporter {
    iterations: Mutex<Vec<(Benchmark, Phase, u32)>>,
    forks: Mutex<Vec<(Benchmark, u32, bool)>>,
    completed: Mutex<Vec<Benchmark>>,
}

impl RunReporter for RecordingReporter {
    fn run_started(&self, _options: &BenchmarkOptions, _benchmarks: &[Benchmark]) {}

    fn fork_started(&self, benchmark: Benchmark, fork: u32, _total: u32, warmup: bool) {
        self.forks.lock().unwrap().push((benchmark, fork, warmup));
    }

    fn iteration_completed(
        &self,
        benchmark: Benchmark,
        phase: Phase,
        index: u32,
        _score: f64,
        _unit: TimeUnit,
    ) {
        self.iterations.lock().unwrap().push((benchmark, phase, index));
    }

    fn benchmark_completed(&self, benchmark: Benchmark, _statistics: &Statistics, _unit: TimeUnit) {
        self.completed.lock().unwrap().push(benchmark);
    }

    fn benchmark_failed(&self, _benchmark: Benchmark, _error: &str) {}
}

#[test]
fn test_in_process_run_covers_all_benchmarks() {
    let report = Runner::new(quick_options(), NoOpRunReporter::new())
        .run()
        .unwrap();

    assert_eq!(report.results().len(), 4);
    assert_eq!(report.failures().count(), 0);
    assert_eq!(report.relative_to_direct(Benchmark::DirectAccess), Some(1.0));

    let table = report.render_table();
    for benchmark in Benchmark::ALL {
        assert!(table.contains(&benchmark.qualified_name()));
    }
}

#[test]
fn test_in_process_run_with_threads() {
    let options = quick_options().with_threads(2);
    let report = Runner::new(options, NoOpRunReporter::new())
        .with_benchmarks([Benchmark::DirectAccess, Benchmark::Reflection])
        .run()
        .unwrap();

    assert_eq!(report.results().len(), 2);
    assert_eq!(report.statistics(Benchmark::Reflection).unwrap().count, 3);
}

#[test]
fn test_forked_run_streams_iterations() {
    let runner = Runner::new(quick_forked_options(), RecordingReporter::default())
        .with_benchmarks([Benchmark::MethodHandle])
        .with_launcher(ForkLauncher::new(binary_path()));

    let report = runner.run().unwrap();

    // 計測フォークの値だけが集計される
    let statistics = report.statistics(Benchmark::MethodHandle).unwrap();
    assert_eq!(statistics.count, 2);

    let reporter = runner.reporter();
    assert_eq!(
        *reporter.forks.lock().unwrap(),
        vec![(Benchmark::MethodHandle, 1, true), (Benchmark::MethodHandle, 2, false)]
    );
    // 2フォーク x (ウォームアップ1 + 計測2)
    let iterations = reporter.iterations.lock().unwrap();
    assert_eq!(iterations.len(), 6);
    assert_eq!(
        iterations
            .iter()
            .filter(|(_, phase, _)| *phase == Phase::Measurement)
            .count(),
        4
    );
    assert_eq!(*reporter.completed.lock().unwrap(), vec![Benchmark::MethodHandle]);
}

#[test]
fn test_forked_run_with_missing_binary_aborts() {
    // 起動失敗は fail-on-error の設定に関係なく致命的
    let options = quick_forked_options().with_fail_on_error(false);
    let result = Runner::new(options, NoOpRunReporter::new())
        .with_launcher(ForkLauncher::new("/nonexistent/reflection_bench"))
        .run();

    match result {
        Err(error) => {
            assert!(matches!(error, HarnessError::Io { .. }));
            assert!(error.is_fatal());
        }
        Ok(_) => panic!("run should abort"),
    }
}

#[test]
fn test_report_export_after_run() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("report.json");

    let report = Runner::new(quick_options(), NoOpRunReporter::new())
        .with_benchmarks([Benchmark::LambdaMetaFactory])
        .run()
        .unwrap();
    report.export_json_report(&path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["results"][0]["benchmark"], "lambda_meta_factory");
    assert_eq!(json["results"][0]["statistics"]["count"], 3);
    assert_eq!(json["options"]["should_do_gc"], true);
}

#[test]
fn test_invalid_options_are_rejected_before_running() {
    let options = quick_options().with_threads(0);
    let result = Runner::new(options, NoOpRunReporter::new()).run();

    assert!(matches!(result, Err(HarnessError::Options { .. })));
}

/// 常に呼び出し失敗を報告するフォーク用スクリプト
///
/// 書き込み直後の exec が並行テストと競合しないよう、一度だけ作って共有する。
#[cfg(unix)]
fn failing_fork_script() -> &'static Path {
    use reflection_bench::core::InvocationError;
    use reflection_bench::harness::fork::ForkFailure;
    use reflection_bench::harness::ForkEvent;
    use std::os::unix::fs::PermissionsExt;

    static SCRIPT: OnceLock<(TempDir, PathBuf)> = OnceLock::new();

    let (_, path) = SCRIPT.get_or_init(|| {
        let event = ForkEvent::Failed {
            failure: ForkFailure::Invocation(InvocationError::invocation_target("name", "boom")),
        };
        let line = serde_json::to_string(&event).unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("failing_fork.sh");
        std::fs::write(&path, format!("#!/bin/sh\necho '{line}'\nexit 1\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        (dir, path)
    });
    path
}

#[cfg(unix)]
#[test]
fn test_forked_fail_on_error_aborts_on_first_failure() {
    let reporter = RecordingReporter::default();

    let runner = Runner::new(quick_forked_options().with_warmup_forks(0), reporter)
        .with_launcher(ForkLauncher::new(failing_fork_script()));
    let result = runner.run();

    assert!(matches!(result, Err(HarnessError::Benchmark { .. })));
    // 最初のベンチマークで中断し、後続は実行されない
    assert_eq!(runner.reporter().forks.lock().unwrap().len(), 1);
}

#[cfg(unix)]
#[test]
fn test_forked_failures_are_recorded_when_fail_on_error_disabled() {
    let options = quick_forked_options()
        .with_warmup_forks(0)
        .with_fail_on_error(false);

    let report = Runner::new(options, NoOpRunReporter::new())
        .with_launcher(ForkLauncher::new(failing_fork_script()))
        .run()
        .unwrap();

    assert_eq!(report.results().len(), 4);
    assert_eq!(report.failures().count(), 4);
    assert!(report
        .failures()
        .all(|result| result.error.as_deref().unwrap_or_default().contains("boom")));
}

/// リフレクションの記述子だけアクセス検査で失敗する状態
fn failing_reflection_state() -> BenchmarkState {
    let state = BenchmarkState::setup().unwrap();
    let mut method = state.method().clone();
    method.set_accessible(false);

    BenchmarkState::from_parts(
        state.student().clone(),
        method,
        *state.handle(),
        StudentNameFunction,
    )
}

#[test]
fn test_in_process_fail_on_error_aborts_on_reflection_failure() {
    let runner = Runner::new(quick_options(), RecordingReporter::default())
        .with_state(failing_reflection_state())
        .with_benchmarks([
            Benchmark::DirectAccess,
            Benchmark::Reflection,
            Benchmark::MethodHandle,
        ]);

    match runner.run() {
        Err(HarnessError::Benchmark { benchmark, source }) => {
            assert_eq!(benchmark, "reflection");
            assert_eq!(source, InvocationError::illegal_access("name"));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    // reflection の後のベンチマークは開始されない
    let forks = runner.reporter().forks.lock().unwrap();
    assert_eq!(
        *forks,
        vec![(Benchmark::DirectAccess, 1, false), (Benchmark::Reflection, 1, false)]
    );
    assert_eq!(*runner.reporter().completed.lock().unwrap(), vec![Benchmark::DirectAccess]);
}

#[test]
fn test_in_process_failure_recorded_and_run_continues() {
    let options = quick_options().with_fail_on_error(false);
    let runner = Runner::new(options, RecordingReporter::default())
        .with_state(failing_reflection_state());

    let report = runner.run().unwrap();

    assert_eq!(report.results().len(), 4);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].benchmark, Benchmark::Reflection);
    assert!(failures[0].error.as_deref().unwrap().contains("アクセスが拒否されました"));

    for benchmark in [
        Benchmark::DirectAccess,
        Benchmark::LambdaMetaFactory,
        Benchmark::MethodHandle,
    ] {
        assert_eq!(report.statistics(benchmark).unwrap().count, 3, "{benchmark}");
    }
    assert_eq!(runner.reporter().completed.lock().unwrap().len(), 3);
}

#[test]
fn test_forked_run_without_launcher_is_rejected() {
    let result = Runner::new(quick_forked_options(), RecordingReporter::default())
        .with_benchmarks([Benchmark::DirectAccess])
        .run();

    match result {
        Err(error @ HarnessError::Options { .. }) => {
            assert!(error.is_fatal());
            assert!(error.context().suggestion.is_some());
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
