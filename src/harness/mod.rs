//! ベンチマークハーネス
//!
//! セットアップ・計測対象オペレーション・ランナー・統計・レポートをまとめる

pub mod fork;
pub mod options;
pub mod registry;
pub mod report;
pub mod reporter;
pub mod runner;
pub mod sink;
pub mod state;
pub mod stats;

pub use fork::{run_fork_worker, ForkEvent, ForkLauncher, FORK_WORKER_COMMAND};
pub use options::{BenchmarkOptions, Mode, TimeUnit};
pub use registry::{Benchmark, BENCHMARK_GROUP};
pub use report::{BenchmarkResult, RunReport};
pub use reporter::{ConsoleRunReporter, NoOpRunReporter, Phase, RunReporter};
pub use runner::{execute_fork, run_iteration, IterationResult, Runner};
pub use sink::{Blackhole, Sink};
pub use state::BenchmarkState;
pub use stats::Statistics;
