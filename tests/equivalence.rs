// 四つの呼び出し経路の等価性と副作用のなさ
mod fixtures;

use fixtures::RecordingSink;
use reflection_bench::dispatch::Strategy;
use reflection_bench::harness::{Benchmark, BenchmarkState, Blackhole};
use reflection_bench::Student;

#[test]
fn test_all_paths_return_name() {
    let state = BenchmarkState::setup().unwrap();
    let mut sink = RecordingSink::default();

    state.direct_access(&mut sink);
    state.reflection(&mut sink).unwrap();
    state.method_handle(&mut sink);
    state.lambda_meta_factory(&mut sink);

    assert_eq!(sink.values, vec!["Artem"; 4]);
}

#[test]
fn test_resolved_calls_agree() {
    let state = BenchmarkState::setup().unwrap();
    let student = Student::new("Ada", "Lovelace");

    let calls = state.resolved_calls();
    let strategies: Vec<Strategy> = calls.iter().map(|call| call.strategy()).collect();
    assert_eq!(
        strategies,
        vec![
            Strategy::Direct,
            Strategy::Reflective,
            Strategy::MethodHandle,
            Strategy::GeneratedAdapter
        ]
    );

    // ハンドルは特定のインスタンスに束縛されない
    for call in &calls {
        assert_eq!(call.call(&student).unwrap(), "Ada");
        assert_eq!(call.call(state.student()).unwrap(), "Artem");
    }
}

#[test]
fn test_sink_receives_exactly_n_values() {
    let state = BenchmarkState::setup().unwrap();

    for benchmark in Benchmark::ALL {
        let mut sink = Blackhole::new();
        benchmark.run_batch(&state, &mut sink, 10_000).unwrap();
        assert_eq!(sink.consumed(), 10_000, "{benchmark}");
    }
}

#[test]
fn test_no_hidden_mutation() {
    let state = BenchmarkState::setup().unwrap();
    let before = state.student().clone();
    let handle_name = state.handle().name();

    let mut sink = RecordingSink::default();
    for benchmark in Benchmark::ALL {
        benchmark.run_batch(&state, &mut sink, 250).unwrap();
    }

    assert_eq!(state.student(), &before);
    assert_eq!(state.student().to_string(), "Student[name=Artem, surname=Stacenko]");
    assert_eq!(state.handle().name(), handle_name);
    assert_eq!(sink.values.len(), 1_000);
    assert!(sink.values.iter().all(|value| value == "Artem"));
}

#[test]
fn test_setup_is_deterministic() {
    let first = BenchmarkState::setup().unwrap();
    let second = BenchmarkState::setup().unwrap();

    assert_eq!(first.student(), second.student());
    assert_eq!(first.method().name(), second.method().name());
    assert_eq!(first.handle().method_type(), second.handle().method_type());
}
