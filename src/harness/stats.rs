//! 計測値の統計集計
//!
//! 平均・最小・最大・標本標準偏差と、99.9% 信頼区間の半幅を求める。
//! t分布の分位点は自由度 1, 2 では閉形式、30 までは数表、それ以上では
//! 正規分位点からの Cornish-Fisher 展開で近似する。

use serde::{Deserialize, Serialize};

/// 信頼水準
pub const CONFIDENCE_LEVEL: f64 = 0.999;

// 標準正規分布の 0.9995 分位点
const Z_999: f64 = 3.290_526_731_491_926;

// 自由度 3..=30 の t分布 0.9995 分位点
const T_999_TABLE: [f64; 28] = [
    12.924, 8.610, 6.869, 5.959, 5.408, 5.041, 4.781, 4.587, 4.437, 4.318, 4.221, 4.140, 4.073,
    4.015, 3.965, 3.922, 3.883, 3.850, 3.819, 3.792, 3.768, 3.745, 3.725, 3.707, 3.690, 3.674,
    3.659, 3.646,
];

/// 計測値の統計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
    /// 信頼区間の半幅（2標本未満では NaN）
    pub error: f64,
}

impl Statistics {
    /// 計測値から統計を計算する
    ///
    /// 空の入力では `None` を返す。
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let count = samples.len();
        let n = count as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let (stddev, error) = if count < 2 {
            (f64::NAN, f64::NAN)
        } else {
            let variance = samples
                .iter()
                .map(|sample| (sample - mean).powi(2))
                .sum::<f64>()
                / (n - 1.0);
            let stddev = variance.sqrt();
            let error = t_quantile_999(count - 1) * stddev / n.sqrt();
            (stddev, error)
        };

        Some(Self {
            count,
            mean,
            min,
            max,
            stddev,
            error,
        })
    }

    /// 信頼区間（下限, 上限）
    pub fn confidence_interval(&self) -> (f64, f64) {
        (self.mean - self.error, self.mean + self.error)
    }
}

/// 自由度 `df` の t分布の 0.9995 分位点（両側 99.9%）
pub fn t_quantile_999(df: usize) -> f64 {
    let p = 1.0 - (1.0 - CONFIDENCE_LEVEL) / 2.0;
    match df {
        0 => f64::NAN,
        1 => (std::f64::consts::PI * (p - 0.5)).tan(),
        2 => (2.0 * p - 1.0) / (2.0 * p * (1.0 - p)).sqrt(),
        3..=30 => T_999_TABLE[df - 3],
        // 展開は自由度が小さいと収束が遅い
        _ => cornish_fisher(Z_999, df as f64),
    }
}

fn cornish_fisher(z: f64, n: f64) -> f64 {
    let z2 = z * z;
    let z3 = z2 * z;
    let z5 = z3 * z2;
    let z7 = z5 * z2;
    let z9 = z7 * z2;

    let g1 = (z3 + z) / 4.0;
    let g2 = (5.0 * z5 + 16.0 * z3 + 3.0 * z) / 96.0;
    let g3 = (3.0 * z7 + 19.0 * z5 + 17.0 * z3 - 15.0 * z) / 384.0;
    let g4 = (79.0 * z9 + 776.0 * z7 + 1482.0 * z5 - 1920.0 * z3 - 945.0 * z) / 92160.0;

    z + g1 / n + g2 / n.powi(2) + g3 / n.powi(3) + g4 / n.powi(4)
}
