//! ベンチマーク状態とセットアップ
//!
//! スレッドごとに一つ構築され、計測中は読み取り専用で共有されない。

use super::sink::Sink;
use crate::core::{InvocationError, SetupResult};
use crate::dispatch::{
    adapter::{Function, LambdaMetafactory},
    call::{Direct, Generated, ResolvedCall},
    handle::{Lookup, MethodHandle},
    reflect::{Method, MethodType, Reflect, ValueKind},
};
use crate::subject::{Student, StudentNameFunction};
use std::hint::black_box;
use tracing::debug;

pub const TESTING_METHOD_NAME: &str = "name";
pub const STUDENT_NAME: &str = "Artem";
pub const STUDENT_SURNAME: &str = "Stacenko";

/// 文字列を返す引数なしメソッドのシグネチャ
pub const STRING_ACCESSOR: MethodType = MethodType::returning(ValueKind::Str);

/// 計測対象と解決済みの呼び出しハンドル一式
#[derive(Debug, Clone)]
pub struct BenchmarkState {
    student: Student,
    method: Method,
    method_handle: MethodHandle<Student, str>,
    lambda_meta_factory: StudentNameFunction,
}

impl BenchmarkState {
    /// 既定のアクセサ名でセットアップする
    pub fn setup() -> SetupResult<Self> {
        Self::setup_with(TESTING_METHOD_NAME)
    }

    /// 指定したメソッド名でハンドルを解決してセットアップする
    ///
    /// メソッドが存在しない、シグネチャが合わない、アダプタを束縛できない
    /// 場合は失敗する。
    pub fn setup_with(method_name: &str) -> SetupResult<Self> {
        let lookup = Lookup::public();

        let student = Student::new(STUDENT_NAME, STUDENT_SURNAME);

        let method = Student::type_info().get_method(method_name)?;

        let method_handle = lookup.find_virtual::<Student, str>(method_name, STRING_ACCESSOR)?;

        let lambda_meta_factory = LambdaMetafactory::metafactory(&method_handle, STRING_ACCESSOR)?;

        debug!(method = method_name, "benchmark state ready");

        Ok(Self {
            student,
            method,
            method_handle,
            lambda_meta_factory,
        })
    }

    /// 解決済みの部品から状態を組み立てる
    ///
    /// アクセス検査を無効にした記述子など、`setup` では作れない状態を使う場合向け。
    pub fn from_parts(
        student: Student,
        method: Method,
        method_handle: MethodHandle<Student, str>,
        lambda_meta_factory: StudentNameFunction,
    ) -> Self {
        Self {
            student,
            method,
            method_handle,
            lambda_meta_factory,
        }
    }

    pub fn student(&self) -> &Student {
        &self.student
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn handle(&self) -> &MethodHandle<Student, str> {
        &self.method_handle
    }

    /// 四つの呼び出し経路を [`ResolvedCall`] として列挙する
    pub fn resolved_calls(&self) -> Vec<Box<dyn ResolvedCall<Student>>> {
        vec![
            Box::new(Direct::<Student>(Student::name)),
            Box::new(self.method.clone()),
            Box::new(self.method_handle),
            Box::new(Generated(self.lambda_meta_factory)),
        ]
    }

    /// 直接呼び出し
    #[inline]
    pub fn direct_access<S: Sink>(&self, sink: &mut S) {
        let this = black_box(self);
        let name = this.student.name();

        sink.consume(name);
    }

    /// リフレクション経由の呼び出し
    #[inline]
    pub fn reflection<S: Sink>(&self, sink: &mut S) -> Result<(), InvocationError> {
        let this = black_box(self);
        let value = this.method.invoke(&this.student)?;
        let name = value.as_str().ok_or_else(|| {
            InvocationError::illegal_argument(this.method.name(), "戻り値が str ではありません")
        })?;

        sink.consume(name);
        Ok(())
    }

    /// メソッドハンドル経由の呼び出し
    #[inline]
    pub fn method_handle<S: Sink>(&self, sink: &mut S) {
        let this = black_box(self);
        let name = this.method_handle.invoke(&this.student);

        sink.consume(name);
    }

    /// 生成アダプタ経由の呼び出し
    #[inline]
    pub fn lambda_meta_factory<S: Sink>(&self, sink: &mut S) {
        let this = black_box(self);
        let name = this.lambda_meta_factory.apply(&this.student);

        sink.consume(name);
    }
}
