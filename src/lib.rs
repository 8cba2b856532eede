// アクセサ呼び出し経路のベンチマーク
// 直接呼び出し・リフレクション・メソッドハンドル・生成アダプタの四経路を比較する

pub mod core;
pub mod dispatch;
pub mod subject;
pub mod harness;
pub mod cli;

pub use subject::Student;
