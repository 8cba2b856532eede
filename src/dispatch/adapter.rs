//! 生成アダプタ
//!
//! [`accessor_adapter!`](crate::accessor_adapter) がコンパイル時にアクセサへ直接転送する
//! ゼロサイズ型を生成し、[`LambdaMetafactory`] がセットアップ時に解決済みの
//! [`MethodHandle`] と突き合わせて束縛する。呼び出しは静的ディスパッチで
//! インライン化できるため、直接呼び出しとほぼ同じコストになる。

use super::handle::MethodHandle;
use super::reflect::{MethodType, Reflect, Reflected};
use crate::core::{SetupError, SetupResult};
use tracing::debug;

/// 一引数を受け取り参照を返す関数契約
pub trait Function<T: ?Sized, R: ?Sized> {
    fn apply<'a>(&self, input: &'a T) -> &'a R;
}

/// コンパイル時に生成されたアダプタ
pub trait GeneratedAdapter<T, R>: Function<T, R> + Sized
where
    T: Reflect,
    R: Reflected + ?Sized,
{
    /// 転送先のメソッド名
    const IMPL_METHOD: &'static str;

    fn instantiate() -> Self;
}

/// アダプタをメソッドハンドルに束縛するファクトリ
pub struct LambdaMetafactory;

impl LambdaMetafactory {
    /// `handle` と同じメソッドへ転送するアダプタ `A` を束縛する
    ///
    /// `instantiated` はアダプタが実装する関数契約のシグネチャ。
    pub fn metafactory<T, R, A>(handle: &MethodHandle<T, R>, instantiated: MethodType) -> SetupResult<A>
    where
        T: Reflect,
        R: Reflected + ?Sized,
        A: GeneratedAdapter<T, R>,
    {
        let adapter = std::any::type_name::<A>();

        if handle.name() != A::IMPL_METHOD {
            return Err(SetupError::adapter_synthesis(
                adapter,
                handle.name(),
                format!("アダプタの転送先は {} です", A::IMPL_METHOD),
            ));
        }

        if handle.method_type() != instantiated {
            return Err(SetupError::adapter_synthesis(
                adapter,
                handle.name(),
                format!(
                    "シグネチャ不一致: ハンドル {} / 関数契約 {}",
                    handle.method_type(),
                    instantiated
                ),
            ));
        }

        if R::KIND != instantiated.return_kind() {
            return Err(SetupError::adapter_synthesis(
                adapter,
                handle.name(),
                format!("戻り値型 {} は契約 {} と一致しません", R::KIND, instantiated),
            ));
        }

        debug!(adapter, method = handle.name(), "adapter bound to method handle");
        Ok(A::instantiate())
    }
}

/// アクセサへ直接転送するアダプタ型を生成する
///
/// ```
/// use reflection_bench::accessor_adapter;
/// use reflection_bench::dispatch::adapter::Function;
/// use reflection_bench::subject::Student;
///
/// accessor_adapter!(pub struct SurnameFunction: Function<Student, str> => surname);
///
/// let student = Student::new("Artem", "Stacenko");
/// assert_eq!(SurnameFunction.apply(&student), "Stacenko");
/// ```
#[macro_export]
macro_rules! accessor_adapter {
    ($(#[$meta:meta])* $vis:vis struct $adapter:ident: Function<$target:ty, $ret:ty> => $method:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        $vis struct $adapter;

        impl $crate::dispatch::adapter::Function<$target, $ret> for $adapter {
            #[inline]
            fn apply<'a>(&self, input: &'a $target) -> &'a $ret {
                <$target>::$method(input)
            }
        }

        impl $crate::dispatch::adapter::GeneratedAdapter<$target, $ret> for $adapter {
            const IMPL_METHOD: &'static str = stringify!($method);

            fn instantiate() -> Self {
                $adapter
            }
        }
    };
}
