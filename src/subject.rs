// 計測対象のデータ保持型
// 構築後は不変で、アクセサは name を返すだけ

use crate::accessor_adapter;
use crate::dispatch::reflect::{Reflect, TypeInfo};
use std::fmt;
use std::sync::OnceLock;

/// 学生レコード
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Student {
    name: String,
    surname: String,
}

impl Student {
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
        }
    }

    /// 計測対象のアクセサ
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn surname(&self) -> &str {
        &self.surname
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Student[name={}, surname={}]", self.name, self.surname)
    }
}

impl Reflect for Student {
    fn type_info() -> &'static TypeInfo {
        static INFO: OnceLock<TypeInfo> = OnceLock::new();
        INFO.get_or_init(|| {
            TypeInfo::builder::<Student>("Student")
                .accessor("name", Student::name)
                .accessor("surname", Student::surname)
                .build()
        })
    }
}

accessor_adapter!(
    /// `Student::name` へ直接転送する生成アダプタ
    pub struct StudentNameFunction: Function<Student, str> => name
);
