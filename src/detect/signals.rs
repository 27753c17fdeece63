//! Statistical signals over one channel of a carrier.
//!
//! Every function takes the channel's samples in raster order and is total:
//! empty input yields a neutral value instead of an error.

/// Fraction of samples whose least significant bit is set.
pub fn lsb_ones_ratio(values: &[u8]) -> f64 {
    bit_plane_ratio(values, 0)
}

/// Fraction of samples with bit `plane` set (0 = LSB).
pub fn bit_plane_ratio(values: &[u8], plane: u8) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let ones = values.iter().filter(|&&v| (v >> plane) & 1 == 1).count();
    ones as f64 / values.len() as f64
}

/// Result of the pairs-of-values chi-square test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairChiSquare {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    /// Upper-tail probability. High values mean the pairs (2k, 2k+1) are
    /// suspiciously balanced.
    pub p_value: f64,
}

/// Westfeld–Pfitzmann chi-square over value pairs (2k, 2k+1).
///
/// LSB replacement with random data pushes the two counts of each pair
/// towards their mean, which drives the statistic down and the p-value up.
pub fn pair_chi_square(values: &[u8]) -> PairChiSquare {
    let histogram = histogram(values);
    let mut statistic = 0.0;
    let mut pairs = 0usize;
    for k in 0..128 {
        let a = histogram[2 * k] as f64;
        let b = histogram[2 * k + 1] as f64;
        let expected = (a + b) / 2.0;
        if expected > 0.0 {
            statistic += (a - expected).powi(2) / expected;
            pairs += 1;
        }
    }
    let degrees_of_freedom = pairs.saturating_sub(1);
    PairChiSquare {
        statistic,
        degrees_of_freedom,
        p_value: chi_square_upper_tail(statistic, degrees_of_freedom),
    }
}

/// Shannon entropy of the LSB plane packed into bytes, scaled to [0, 1].
pub fn lsb_plane_entropy(values: &[u8]) -> f64 {
    let packed: Vec<u8> = values
        .chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &v)| acc | ((v & 1) << (7 - i)))
        })
        .collect();
    shannon_entropy(&packed) / 8.0
}

/// Shannon entropy of the sample values themselves (bits per sample).
pub fn channel_entropy(values: &[u8]) -> f64 {
    shannon_entropy(values)
}

/// Mean length of runs of identical consecutive LSBs.
pub fn average_run_length(values: &[u8]) -> f64 {
    let mut iter = values.iter().map(|v| v & 1);
    let Some(mut current) = iter.next() else {
        return 0.0;
    };
    let mut runs = 1usize;
    for bit in iter {
        if bit != current {
            runs += 1;
            current = bit;
        }
    }
    values.len() as f64 / runs as f64
}

/// Estimated fraction of samples that carry embedded bits, by sample pair
/// analysis (Dumitrescu, Wu and Wang) over horizontally and vertically
/// adjacent samples of a `width`-wide channel.
///
/// A pair `(u, v)` belongs to the class `⌊v/2⌋ − ⌊u/2⌋`, which flipping LSBs
/// never changes. In an untouched image the smaller sample of a pair with an
/// odd difference is as often even as odd. LSB replacement flips each sample
/// with probability `q = rate / 2` and skews that balance in a way that is
/// quadratic in `q`:
///
/// ```text
/// 2·C·q² − 2·(C + T)·q + (S + T) = 0
/// ```
///
/// where `C` counts pairs in class 0, `S` those of them that differ by one,
/// and `T` the parity imbalance of pairs in higher classes. The smaller root
/// is the estimate. Pairs are counted in both orientations so the estimate
/// does not depend on scan direction.
///
/// Unlike the LSB-plane signals this stays near 0 on covers whose LSB plane
/// is sensor noise, because it looks at how values relate to their
/// neighbours rather than at the LSBs alone.
pub fn sample_pair_rate(values: &[u8], width: usize) -> f64 {
    if width == 0 || values.len() < 2 {
        return 0.0;
    }
    let horizontal = values
        .chunks(width)
        .flat_map(|row| row.windows(2).map(|w| (w[0], w[1])));
    let vertical = values.iter().zip(values.iter().skip(width)).map(|(&a, &b)| (a, b));

    let mut close: f64 = 0.0;
    let mut unit = 0.0;
    let mut imbalance = 0.0;
    for (a, b) in horizontal.chain(vertical) {
        let (u, v) = if a >> 1 <= b >> 1 { (a, b) } else { (b, a) };
        if u >> 1 == v >> 1 {
            close += 2.0;
            if u != v {
                unit += 2.0;
            }
            continue;
        }
        match (u & 1, v & 1) {
            (0, 1) => imbalance += 2.0,
            (1, 0) => imbalance -= 2.0,
            _ => {}
        }
    }
    if close == 0.0 {
        return 0.0;
    }

    let a = 2.0 * close;
    let b = -2.0 * (close + imbalance);
    let c = unit + imbalance;
    let discriminant = b * b - 4.0 * a * c;
    let q = if discriminant < 0.0 {
        -b / (2.0 * a)
    } else {
        (-b - discriminant.sqrt()) / (2.0 * a)
    };
    (2.0 * q).clamp(0.0, 1.0)
}

fn histogram(values: &[u8]) -> [u64; 256] {
    let mut freq = [0u64; 256];
    for &v in values {
        freq[v as usize] += 1;
    }
    freq
}

fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let len = data.len() as f64;
    histogram(data)
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Upper-tail probability of a chi-square statistic (Wilson–Hilferty).
pub fn chi_square_upper_tail(statistic: f64, df: usize) -> f64 {
    if df == 0 {
        return 0.0;
    }
    let k = df as f64;
    let spread = 2.0 / (9.0 * k);
    let z = ((statistic / k).cbrt() - (1.0 - spread)) / spread.sqrt();
    (0.5 * (1.0 - erf(z / std::f64::consts::SQRT_2))).clamp(0.0, 1.0)
}

/// Abramowitz–Stegun 7.1.26 approximation.
pub fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();
    sign * y
}
