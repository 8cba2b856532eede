//! 呼び出し経路の解決
//!
//! 同じアクセサを呼び出す四つの経路（直接・リフレクション・メソッドハンドル・
//! 生成アダプタ）を構成する部品を提供

pub mod adapter;
pub mod call;
pub mod handle;
pub mod reflect;

pub use adapter::{Function, GeneratedAdapter, LambdaMetafactory};
pub use call::{Direct, Generated, ResolvedCall, Strategy};
pub use handle::{Lookup, MethodHandle};
pub use reflect::{Method, MethodType, Reflect, Reflected, TypeInfo, Value, ValueKind};
