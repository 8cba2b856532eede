// 統合テスト用のヘルパーとテスト対象型
#![allow(dead_code)]

use reflection_bench::dispatch::{Reflect, TypeInfo};
use reflection_bench::harness::{BenchmarkOptions, Sink};
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

/// 数ミリ秒で終わるプロセス内実行の設定
pub fn quick_options() -> BenchmarkOptions {
    BenchmarkOptions::new()
        .in_process()
        .with_warmup(1, Duration::from_millis(1))
        .with_measurement(3, Duration::from_millis(2))
}

/// 数ミリ秒で終わるフォーク実行の設定
pub fn quick_forked_options() -> BenchmarkOptions {
    BenchmarkOptions::new()
        .with_forks(1)
        .with_warmup_forks(1)
        .with_warmup(1, Duration::from_millis(1))
        .with_measurement(2, Duration::from_millis(2))
}

/// ビルド済みバイナリのパス
pub fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_reflection_bench"))
}

/// 受け取った値を全て記録するシンク
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub values: Vec<String>,
}

impl Sink for RecordingSink {
    fn consume(&mut self, value: &str) {
        self.values.push(value.to_string());
    }
}

/// アクセサが常にパニックする型
#[derive(Debug)]
pub struct BrokenSensor {
    pub label: String,
}

impl BrokenSensor {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn reading(&self) -> &str {
        panic!("sensor {} is offline", self.label)
    }
}

impl Reflect for BrokenSensor {
    fn type_info() -> &'static TypeInfo {
        static INFO: OnceLock<TypeInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            TypeInfo::builder::<BrokenSensor>("BrokenSensor")
                .accessor("label", BrokenSensor::label)
                .accessor("reading", BrokenSensor::reading)
                .build()
        })
    }
}
