//! 実行時リフレクション層
//!
//! 型ごとのメタデータ（[`TypeInfo`]）に名前付きアクセサを登録し、
//! 名前で [`Method`] 記述子を引いて型消去されたレシーバに対して呼び出す。
//! 呼び出しのたびにレシーバの型検査・アクセス検査・パニック捕捉を行うため、
//! 直接呼び出しより明確に重い経路になる。

use crate::core::{InvocationError, SetupError, SetupResult};
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// 登録されたアクセサの関数ポインタ型
pub type Accessor<T, R> = for<'a> fn(&'a T) -> &'a R;

/// 型消去された呼び出し関数
type ErasedInvoker = Box<dyn for<'a> Fn(&'a dyn Any) -> Option<Value<'a>> + Send + Sync>;

/// リフレクション経由で返される値の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Str,
    U64,
    Bool,
}

impl ValueKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::U64 => "u64",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// リフレクション呼び出しの戻り値（動的型）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    Str(&'a str),
    U64(u64),
    Bool(bool),
}

impl<'a> Value<'a> {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Str(_) => ValueKind::Str,
            Self::U64(_) => ValueKind::U64,
            Self::Bool(_) => ValueKind::Bool,
        }
    }

    /// 文字列としてキャストする
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }
}

/// リフレクションで返却可能な型
pub trait Reflected: 'static {
    const KIND: ValueKind;

    fn to_value(&self) -> Value<'_>;
}

impl Reflected for str {
    const KIND: ValueKind = ValueKind::Str;

    fn to_value(&self) -> Value<'_> {
        Value::Str(self)
    }
}

impl Reflected for u64 {
    const KIND: ValueKind = ValueKind::U64;

    fn to_value(&self) -> Value<'_> {
        Value::U64(*self)
    }
}

impl Reflected for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn to_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

/// メソッドの可視性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// 引数なしメソッドのシグネチャ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodType {
    return_kind: ValueKind,
}

impl MethodType {
    /// 指定した戻り値型の引数なしシグネチャを作成
    pub const fn returning(return_kind: ValueKind) -> Self {
        Self { return_kind }
    }

    pub const fn return_kind(&self) -> ValueKind {
        self.return_kind
    }

    pub const fn parameter_count(&self) -> usize {
        0
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "()-> {}", self.return_kind)
    }
}

/// 登録済みメソッドのメタデータ
pub struct MethodInfo {
    name: &'static str,
    declaring_type: &'static str,
    declaring_type_id: TypeId,
    method_type: MethodType,
    visibility: Visibility,
    invoker: ErasedInvoker,
    // 型付きの `Accessor<T, R>` を保持する。ハンドル解決時にダウンキャストする
    accessor: Box<dyn Any + Send + Sync>,
}

impl MethodInfo {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declaring_type(&self) -> &'static str {
        self.declaring_type
    }

    pub fn declaring_type_id(&self) -> TypeId {
        self.declaring_type_id
    }

    pub fn method_type(&self) -> MethodType {
        self.method_type
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// 型付きアクセサを取り出す（型が合わなければ `None`）
    pub fn typed_accessor<T: 'static, R: ?Sized + 'static>(&self) -> Option<Accessor<T, R>> {
        self.accessor.downcast_ref::<Accessor<T, R>>().copied()
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("declaring_type", &self.declaring_type)
            .field("method_type", &self.method_type)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

/// 型の実行時メタデータ
#[derive(Debug)]
pub struct TypeInfo {
    name: &'static str,
    type_id: TypeId,
    methods: Vec<MethodInfo>,
}

impl TypeInfo {
    /// 型 `T` のメタデータ構築を開始
    pub fn builder<T: Any>(name: &'static str) -> TypeInfoBuilder<T> {
        TypeInfoBuilder {
            name,
            methods: Vec::new(),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    /// 可視性を問わずメソッド情報を名前で探す
    pub fn find(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// 公開メソッドを名前で解決する
    pub fn get_method(&'static self, name: &str) -> SetupResult<Method> {
        self.find(name)
            .filter(|method| method.visibility == Visibility::Public)
            .map(Method::new)
            .ok_or_else(|| SetupError::method_not_found(self.name, name))
    }

    /// 可視性を問わずメソッドを名前で解決する
    ///
    /// 非公開メソッドは [`Method::set_accessible`] を呼ぶまで呼び出せない。
    pub fn get_declared_method(&'static self, name: &str) -> SetupResult<Method> {
        self.find(name)
            .map(Method::new)
            .ok_or_else(|| SetupError::method_not_found(self.name, name))
    }
}

/// [`TypeInfo`] のビルダー
pub struct TypeInfoBuilder<T> {
    name: &'static str,
    methods: Vec<MethodInfo>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Any> TypeInfoBuilder<T> {
    /// 公開アクセサを登録
    pub fn accessor<R: Reflected + ?Sized>(self, name: &'static str, accessor: Accessor<T, R>) -> Self {
        self.register(name, Visibility::Public, accessor)
    }

    /// 非公開アクセサを登録
    pub fn private_accessor<R: Reflected + ?Sized>(
        self,
        name: &'static str,
        accessor: Accessor<T, R>,
    ) -> Self {
        self.register(name, Visibility::Private, accessor)
    }

    fn register<R: Reflected + ?Sized>(
        mut self,
        name: &'static str,
        visibility: Visibility,
        accessor: Accessor<T, R>,
    ) -> Self {
        let invoker = erase(move |receiver: &dyn Any| {
            receiver
                .downcast_ref::<T>()
                .map(|target| accessor(target).to_value())
        });

        self.methods.push(MethodInfo {
            name,
            declaring_type: self.name,
            declaring_type_id: TypeId::of::<T>(),
            method_type: MethodType::returning(R::KIND),
            visibility,
            invoker,
            accessor: Box::new(accessor),
        });
        self
    }

    pub fn build(self) -> TypeInfo {
        TypeInfo {
            name: self.name,
            type_id: TypeId::of::<T>(),
            methods: self.methods,
        }
    }
}

// クロージャの高階ライフタイムを確定させるためのヘルパー
fn erase<F>(invoker: F) -> ErasedInvoker
where
    F: for<'a> Fn(&'a dyn Any) -> Option<Value<'a>> + Send + Sync + 'static,
{
    Box::new(invoker)
}

/// 実行時メタデータを公開する型
pub trait Reflect: Any {
    fn type_info() -> &'static TypeInfo;
}

/// 名前で解決したリフレクションメソッド記述子
#[derive(Debug, Clone)]
pub struct Method {
    info: &'static MethodInfo,
    accessible: bool,
}

impl Method {
    fn new(info: &'static MethodInfo) -> Self {
        Self {
            info,
            accessible: info.visibility == Visibility::Public,
        }
    }

    pub fn name(&self) -> &'static str {
        self.info.name
    }

    pub fn declaring_type(&self) -> &'static str {
        self.info.declaring_type
    }

    pub fn method_type(&self) -> MethodType {
        self.info.method_type
    }

    pub fn info(&self) -> &'static MethodInfo {
        self.info
    }

    pub fn is_accessible(&self) -> bool {
        self.accessible
    }

    /// アクセス検査を抑止する
    pub fn set_accessible(&mut self, accessible: bool) {
        self.accessible = accessible;
    }

    /// レシーバに対してメソッドを呼び出す
    ///
    /// 呼び出し先のパニックは [`InvocationError::InvocationTarget`] に包まれる。
    pub fn invoke<'a>(&self, receiver: &'a dyn Any) -> Result<Value<'a>, InvocationError> {
        if !self.accessible {
            return Err(InvocationError::illegal_access(self.info.name));
        }

        let invoker = &self.info.invoker;
        match panic::catch_unwind(AssertUnwindSafe(|| invoker(receiver))) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(InvocationError::illegal_argument(
                self.info.name,
                format!("レシーバが {} のインスタンスではありません", self.info.declaring_type),
            )),
            Err(payload) => Err(InvocationError::invocation_target(
                self.info.name,
                panic_message(payload.as_ref()),
            )),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
