// 解決済み呼び出しの抽象化
// 解決戦略ごとに一つの実装を持ち、セットアップ時に一度だけ構築される

use super::adapter::Function;
use super::handle::MethodHandle;
use super::reflect::{Method, Reflect};
use crate::core::InvocationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 呼び出し経路の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Direct,
    Reflective,
    MethodHandle,
    GeneratedAdapter,
}

impl Strategy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Reflective => "reflective",
            Self::MethodHandle => "method_handle",
            Self::GeneratedAdapter => "generated_adapter",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 対象の文字列アクセサを呼び出す能力
pub trait ResolvedCall<T> {
    fn strategy(&self) -> Strategy;

    fn call<'a>(&self, subject: &'a T) -> Result<&'a str, InvocationError>;
}

impl<T: Reflect> ResolvedCall<T> for Method {
    fn strategy(&self) -> Strategy {
        Strategy::Reflective
    }

    fn call<'a>(&self, subject: &'a T) -> Result<&'a str, InvocationError> {
        let value = self.invoke(subject)?;
        value.as_str().ok_or_else(|| {
            InvocationError::illegal_argument(
                self.name(),
                format!("戻り値 {} は str にキャストできません", value.kind()),
            )
        })
    }
}

impl<T: Reflect> ResolvedCall<T> for MethodHandle<T, str> {
    fn strategy(&self) -> Strategy {
        Strategy::MethodHandle
    }

    #[inline]
    fn call<'a>(&self, subject: &'a T) -> Result<&'a str, InvocationError> {
        Ok(self.invoke(subject))
    }
}

/// 生成アダプタを [`ResolvedCall`] として扱うラッパー
#[derive(Debug, Clone, Copy, Default)]
pub struct Generated<A>(pub A);

impl<T, A> ResolvedCall<T> for Generated<A>
where
    A: Function<T, str>,
{
    fn strategy(&self) -> Strategy {
        Strategy::GeneratedAdapter
    }

    #[inline]
    fn call<'a>(&self, subject: &'a T) -> Result<&'a str, InvocationError> {
        Ok(self.0.apply(subject))
    }
}

/// 静的ディスパッチによる直接呼び出し
pub struct Direct<T>(pub for<'a> fn(&'a T) -> &'a str);

impl<T> ResolvedCall<T> for Direct<T> {
    fn strategy(&self) -> Strategy {
        Strategy::Direct
    }

    #[inline]
    fn call<'a>(&self, subject: &'a T) -> Result<&'a str, InvocationError> {
        Ok((self.0)(subject))
    }
}
