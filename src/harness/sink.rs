// 計測結果の受け皿（ブラックホール）
// 戻り値が使われていないと最適化で証明されないように値を消費する

use mockall::automock;
use std::hint::black_box;

/// 計測対象の戻り値を消費するシンク
#[automock]
pub trait Sink {
    /// 値を一つ消費する
    fn consume(&mut self, value: &str);
}

/// `std::hint::black_box` で値を消費するシンク
///
/// 受け取った値の個数だけを数える。
#[derive(Debug, Default)]
pub struct Blackhole {
    consumed: u64,
}

impl Blackhole {
    pub fn new() -> Self {
        Self::default()
    }

    /// これまでに消費した値の個数
    pub fn consumed(&self) -> u64 {
        self.consumed
    }
}

impl Sink for Blackhole {
    #[inline]
    fn consume(&mut self, value: &str) {
        black_box(value);
        self.consumed += 1;
    }
}
