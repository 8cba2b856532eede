//! 計測結果のレポート
//!
//! 結果表のテキスト出力と JSON 形式での書き出し

use super::options::{BenchmarkOptions, Mode, TimeUnit};
use super::registry::Benchmark;
use super::stats::Statistics;
use crate::core::HarnessResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// 一つのベンチマークの結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub benchmark: Benchmark,
    pub mode: Mode,
    pub unit: TimeUnit,
    /// 成功時の統計
    pub statistics: Option<Statistics>,
    /// 失敗時のエラーメッセージ
    pub error: Option<String>,
}

impl BenchmarkResult {
    pub fn is_success(&self) -> bool {
        self.statistics.is_some()
    }
}

/// ラン全体の結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub timestamp: DateTime<Utc>,
    pub options: BenchmarkOptions,
    results: Vec<BenchmarkResult>,
}

impl RunReport {
    pub fn new(options: BenchmarkOptions) -> Self {
        Self {
            timestamp: Utc::now(),
            options,
            results: Vec::new(),
        }
    }

    pub fn push_success(&mut self, benchmark: Benchmark, statistics: Statistics) {
        self.results.push(BenchmarkResult {
            benchmark,
            mode: self.options.mode(),
            unit: self.options.time_unit(),
            statistics: Some(statistics),
            error: None,
        });
    }

    pub fn push_failure(&mut self, benchmark: Benchmark, error: impl Into<String>) {
        self.results.push(BenchmarkResult {
            benchmark,
            mode: self.options.mode(),
            unit: self.options.time_unit(),
            statistics: None,
            error: Some(error.into()),
        });
    }

    pub fn results(&self) -> &[BenchmarkResult] {
        &self.results
    }

    pub fn get(&self, benchmark: Benchmark) -> Option<&BenchmarkResult> {
        self.results.iter().find(|r| r.benchmark == benchmark)
    }

    pub fn statistics(&self, benchmark: Benchmark) -> Option<&Statistics> {
        self.get(benchmark).and_then(|r| r.statistics.as_ref())
    }

    pub fn failures(&self) -> impl Iterator<Item = &BenchmarkResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    /// 直接呼び出しに対する倍率
    pub fn relative_to_direct(&self, benchmark: Benchmark) -> Option<f64> {
        let baseline = self.statistics(Benchmark::DirectAccess)?.mean;
        let score = self.statistics(benchmark)?.mean;
        (baseline > 0.0).then(|| score / baseline)
    }

    /// 結果表を描画する（名前順）
    pub fn render_table(&self) -> String {
        let mut rows: Vec<&BenchmarkResult> = self.results.iter().collect();
        rows.sort_by_key(|r| r.benchmark.name());

        let name_width = rows
            .iter()
            .map(|r| r.benchmark.qualified_name().len())
            .max()
            .unwrap_or(0)
            .max("Benchmark".len());

        let mut table = String::new();
        let _ = writeln!(
            table,
            "{:<name_width$}  {:>4}  {:>3}  {:>12}  {:>12}  {}",
            "Benchmark", "Mode", "Cnt", "Score", "Error", "Units"
        );

        for row in rows {
            let name = row.benchmark.qualified_name();
            match &row.statistics {
                Some(stats) => {
                    let error = if stats.error.is_nan() {
                        String::new()
                    } else {
                        format!("± {:.3}", stats.error)
                    };
                    let _ = writeln!(
                        table,
                        "{:<name_width$}  {:>4}  {:>3}  {:>12.3}  {:>12}  {}",
                        name,
                        row.mode.short_label(),
                        stats.count,
                        stats.mean,
                        error,
                        row.unit
                    );
                }
                None => {
                    let _ = writeln!(
                        table,
                        "{:<name_width$}  {:>4}  {:>3}  {:>12}  {:>12}  FAILED",
                        name,
                        row.mode.short_label(),
                        0,
                        "-",
                        "-"
                    );
                }
            }
        }

        table
    }

    /// サマリーを標準出力に表示
    pub fn print_summary(&self) {
        println!();
        println!("📊 ベンチマーク結果");
        print!("{}", self.render_table());

        let mut ranked: Vec<(Benchmark, f64)> = self
            .results
            .iter()
            .filter_map(|r| r.statistics.as_ref().map(|s| (r.benchmark, s.mean)))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((fastest, _)) = ranked.first() {
            println!();
            println!("🏆 最速: {}", fastest.name());
        }
        for (benchmark, _) in &ranked {
            if let Some(ratio) = self.relative_to_direct(*benchmark) {
                println!("  {:<20} x{ratio:.2} (vs direct_access)", benchmark.name());
            }
        }

        let failures = self.failures().count();
        if failures > 0 {
            println!("⚠️  {failures}個のベンチマークが失敗しました");
        }
    }

    /// JSON 形式でファイルに書き出す
    pub fn export_json_report(&self, path: impl AsRef<Path>) -> HarnessResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
