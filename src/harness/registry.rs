// 計測対象オペレーションの登録
// 四つの呼び出し経路を名前付きで列挙する

use super::sink::Sink;
use super::state::BenchmarkState;
use crate::core::InvocationError;
use crate::dispatch::call::Strategy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ベンチマーク名の接頭辞
pub const BENCHMARK_GROUP: &str = "ReflectionBenchmark";

/// 計測対象のオペレーション
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Benchmark {
    #[value(name = "direct_access")]
    DirectAccess,
    #[value(name = "reflection")]
    Reflection,
    #[value(name = "method_handle")]
    MethodHandle,
    #[value(name = "lambda_meta_factory")]
    LambdaMetaFactory,
}

impl Benchmark {
    /// 登録済みの全オペレーション（実行順）
    pub const ALL: [Benchmark; 4] = [
        Benchmark::DirectAccess,
        Benchmark::LambdaMetaFactory,
        Benchmark::MethodHandle,
        Benchmark::Reflection,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::DirectAccess => "direct_access",
            Self::Reflection => "reflection",
            Self::MethodHandle => "method_handle",
            Self::LambdaMetaFactory => "lambda_meta_factory",
        }
    }

    /// レポートに表示する完全名
    pub fn qualified_name(&self) -> String {
        format!("{BENCHMARK_GROUP}.{}", self.name())
    }

    pub const fn strategy(&self) -> Strategy {
        match self {
            Self::DirectAccess => Strategy::Direct,
            Self::Reflection => Strategy::Reflective,
            Self::MethodHandle => Strategy::MethodHandle,
            Self::LambdaMetaFactory => Strategy::GeneratedAdapter,
        }
    }

    /// オペレーションを `ops` 回続けて実行する
    ///
    /// 分岐はループの外で一度だけ行う。
    pub fn run_batch<S: Sink>(
        &self,
        state: &BenchmarkState,
        sink: &mut S,
        ops: u64,
    ) -> Result<(), InvocationError> {
        match self {
            Self::DirectAccess => {
                for _ in 0..ops {
                    state.direct_access(sink);
                }
            }
            Self::Reflection => {
                for _ in 0..ops {
                    state.reflection(sink)?;
                }
            }
            Self::MethodHandle => {
                for _ in 0..ops {
                    state.method_handle(sink);
                }
            }
            Self::LambdaMetaFactory => {
                for _ in 0..ops {
                    state.lambda_meta_factory(sink);
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
