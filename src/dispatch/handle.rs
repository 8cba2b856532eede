//! シグネチャベースのメソッドハンドル解決
//!
//! 名前・レシーバ型・戻り値型の検査を解決時に一度だけ行い、
//! 以後の呼び出しは関数ポインタ経由の単純な間接呼び出しになる。

use super::reflect::{Accessor, MethodType, Reflect, Reflected, Visibility};
use crate::core::{SetupError, SetupResult};
use std::fmt;
use tracing::debug;

/// メソッドハンドルの解決器
#[derive(Debug, Clone, Copy, Default)]
pub struct Lookup {
    private_access: bool,
}

impl Lookup {
    /// 公開メソッドのみを解決するルックアップ
    pub fn public() -> Self {
        Self {
            private_access: false,
        }
    }

    /// 非公開メソッドも解決できるルックアップ
    pub fn with_private_access() -> Self {
        Self {
            private_access: true,
        }
    }

    /// 型 `T` のメソッド `name` を `method_type` で解決する
    pub fn find_virtual<T, R>(&self, name: &str, method_type: MethodType) -> SetupResult<MethodHandle<T, R>>
    where
        T: Reflect,
        R: Reflected + ?Sized,
    {
        let type_info = T::type_info();
        let info = type_info
            .find(name)
            .filter(|info| self.private_access || info.visibility() == Visibility::Public)
            .ok_or_else(|| SetupError::method_not_found(type_info.name(), name))?;

        if info.method_type() != method_type {
            return Err(SetupError::wrong_method_type(
                type_info.name(),
                name,
                method_type.to_string(),
                info.method_type().to_string(),
            ));
        }

        // 要求された MethodType と型パラメータ R の食い違いもここで弾く
        let target = info.typed_accessor::<T, R>().ok_or_else(|| {
            SetupError::wrong_method_type(
                type_info.name(),
                name,
                MethodType::returning(R::KIND).to_string(),
                info.method_type().to_string(),
            )
        })?;

        debug!(
            type_name = type_info.name(),
            method = info.name(),
            method_type = %method_type,
            "method handle resolved"
        );

        Ok(MethodHandle {
            name: info.name(),
            declaring_type: info.declaring_type(),
            method_type,
            target,
        })
    }
}

/// 解決済みのメソッドハンドル
pub struct MethodHandle<T: 'static, R: ?Sized + 'static> {
    name: &'static str,
    declaring_type: &'static str,
    method_type: MethodType,
    target: Accessor<T, R>,
}

impl<T: 'static, R: ?Sized + 'static> MethodHandle<T, R> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declaring_type(&self) -> &'static str {
        self.declaring_type
    }

    pub fn method_type(&self) -> MethodType {
        self.method_type
    }

    /// 対象メソッドを呼び出す
    ///
    /// 呼び出し先のパニックは捕捉されずにそのまま伝播する。
    #[inline]
    pub fn invoke<'a>(&self, receiver: &'a T) -> &'a R {
        (self.target)(receiver)
    }
}

// 派生マクロだと T: Clone を要求してしまうため手書き
impl<T: 'static, R: ?Sized + 'static> Clone for MethodHandle<T, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static, R: ?Sized + 'static> Copy for MethodHandle<T, R> {}

impl<T: 'static, R: ?Sized + 'static> fmt::Debug for MethodHandle<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodHandle")
            .field("name", &self.name)
            .field("declaring_type", &self.declaring_type)
            .field("method_type", &self.method_type)
            .finish_non_exhaustive()
    }
}
