use crate::harness::{Benchmark, BenchmarkOptions};

/// 登録済みベンチマークと実行設定を表示
pub fn execute_list() {
    let options = BenchmarkOptions::default();

    println!("📋 登録済みベンチマーク:");
    for benchmark in Benchmark::ALL {
        println!("  - {} ({})", benchmark.qualified_name(), benchmark.strategy());
    }

    println!();
    println!("⚙️  設定:");
    println!("   - モード: {}", options.mode().short_label());
    println!("   - 単位: {}", options.time_unit());
    println!(
        "   - フォーク: {} (+{} warmup)",
        options.forks(),
        options.warmup_forks()
    );
    println!(
        "   - ウォームアップ: {} x {:?}",
        options.warmup_iterations(),
        options.warmup_time()
    );
    println!(
        "   - 計測: {} x {:?}",
        options.measurement_iterations(),
        options.measurement_time()
    );
    println!("   - スレッド数: {}", options.threads());
    println!("   - fail-on-error: {}", options.fail_on_error());
    println!("   - 推定実行時間: {:?}", options.estimated_duration() * Benchmark::ALL.len() as u32);
}
