// 計測ランの設定
// 全てコンパイル時定数で、実行時に外部から与えることはない

use crate::core::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const SHOULD_FAIL_ON_ERROR: bool = true;
pub const SHOULD_DO_GC: bool = true;

pub const FORKS_COUNT: u32 = 1;

pub const WARMUP_FORKS_COUNT: u32 = 1;
pub const WARMUP_ITERATIONS_COUNT: u32 = 10;
pub const WARMUP_TIME: Duration = Duration::from_secs(5);

pub const MEASUREMENT_ITERATIONS_COUNT: u32 = 50;
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(5);

pub const THREADS_COUNT: usize = 1;

/// 計測モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// 一回の呼び出しあたりの平均時間
    AverageTime,
}

impl Mode {
    /// レポート表示用の短縮名
    pub const fn short_label(&self) -> &'static str {
        match self {
            Self::AverageTime => "avgt",
        }
    }
}

/// 計測結果の時間単位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    /// 経過時間と呼び出し回数から一回あたりの時間をこの単位で求める
    pub fn per_op(&self, elapsed: Duration, ops: u64) -> f64 {
        if ops == 0 {
            return f64::NAN;
        }
        let nanos = elapsed.as_nanos() as f64 / ops as f64;
        nanos / self.nanos_per_unit()
    }

    pub const fn nanos_per_unit(&self) -> f64 {
        match self {
            Self::Nanoseconds => 1.0,
            Self::Microseconds => 1_000.0,
            Self::Milliseconds => 1_000_000.0,
            Self::Seconds => 1_000_000_000.0,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Nanoseconds => "ns/op",
            Self::Microseconds => "us/op",
            Self::Milliseconds => "ms/op",
            Self::Seconds => "s/op",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// ベンチマーク実行設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkOptions {
    mode: Mode,
    time_unit: TimeUnit,
    forks: u32,
    warmup_forks: u32,
    warmup_iterations: u32,
    warmup_time: Duration,
    measurement_iterations: u32,
    measurement_time: Duration,
    fail_on_error: bool,
    should_do_gc: bool,
    threads: usize,
}

impl BenchmarkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_unit(mut self, time_unit: TimeUnit) -> Self {
        self.time_unit = time_unit;
        self
    }

    pub fn with_forks(mut self, forks: u32) -> Self {
        self.forks = forks;
        self
    }

    pub fn with_warmup_forks(mut self, warmup_forks: u32) -> Self {
        self.warmup_forks = warmup_forks;
        self
    }

    pub fn with_warmup(mut self, iterations: u32, time: Duration) -> Self {
        self.warmup_iterations = iterations;
        self.warmup_time = time;
        self
    }

    pub fn with_measurement(mut self, iterations: u32, time: Duration) -> Self {
        self.measurement_iterations = iterations;
        self.measurement_time = time;
        self
    }

    pub fn with_fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.fail_on_error = fail_on_error;
        self
    }

    pub fn with_gc(mut self, should_do_gc: bool) -> Self {
        self.should_do_gc = should_do_gc;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// フォークを使わずにプロセス内で計測する設定に切り替える
    pub fn in_process(self) -> Self {
        self.with_forks(0).with_warmup_forks(0)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    pub fn forks(&self) -> u32 {
        self.forks
    }

    pub fn warmup_forks(&self) -> u32 {
        self.warmup_forks
    }

    pub fn warmup_iterations(&self) -> u32 {
        self.warmup_iterations
    }

    pub fn warmup_time(&self) -> Duration {
        self.warmup_time
    }

    pub fn measurement_iterations(&self) -> u32 {
        self.measurement_iterations
    }

    pub fn measurement_time(&self) -> Duration {
        self.measurement_time
    }

    pub fn fail_on_error(&self) -> bool {
        self.fail_on_error
    }

    pub fn should_do_gc(&self) -> bool {
        self.should_do_gc
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// フォーク分離が有効かどうか
    pub fn is_forked(&self) -> bool {
        self.forks > 0
    }

    /// 1ベンチマークあたりの計測時間の概算
    pub fn estimated_duration(&self) -> Duration {
        let per_fork = self.warmup_time * self.warmup_iterations
            + self.measurement_time * self.measurement_iterations;
        per_fork * (self.forks.max(1) + self.warmup_forks)
    }

    /// 設定の整合性を検証する
    pub fn validate(&self) -> ValidationResult<()> {
        if self.measurement_iterations == 0 {
            return Err(ValidationError::new(
                "measurement_iterations",
                "1以上である必要があります",
            ));
        }
        if self.measurement_time.is_zero() {
            return Err(ValidationError::new(
                "measurement_time",
                "0より大きい必要があります",
            ));
        }
        if self.warmup_iterations > 0 && self.warmup_time.is_zero() {
            return Err(ValidationError::new(
                "warmup_time",
                "ウォームアップ反復がある場合は0より大きい必要があります",
            ));
        }
        if self.threads == 0 {
            return Err(ValidationError::new("threads", "1以上である必要があります"));
        }
        if self.forks == 0 && self.warmup_forks > 0 {
            return Err(ValidationError::new(
                "warmup_forks",
                "プロセス内計測ではウォームアップフォークを指定できません",
            ));
        }
        Ok(())
    }
}

impl Default for BenchmarkOptions {
    fn default() -> Self {
        Self {
            mode: Mode::AverageTime,
            time_unit: TimeUnit::Nanoseconds,
            forks: FORKS_COUNT,
            warmup_forks: WARMUP_FORKS_COUNT,
            warmup_iterations: WARMUP_ITERATIONS_COUNT,
            warmup_time: WARMUP_TIME,
            measurement_iterations: MEASUREMENT_ITERATIONS_COUNT,
            measurement_time: MEASUREMENT_TIME,
            fail_on_error: SHOULD_FAIL_ON_ERROR,
            should_do_gc: SHOULD_DO_GC,
            threads: THREADS_COUNT,
        }
    }
}
