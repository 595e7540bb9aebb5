//! Trend smoothing
//!
//! Trailing simple moving averages for chart overlays. Two policies exist and are
//! applied per metric:
//!
//! - [`sma`]: strict. Emits a value only once a full window of history exists.
//!   Used for dense series (workout minutes, calories burned).
//! - [`sma_sparse`]: tolerant. Averages the non-null values in the (possibly
//!   truncated) window and emits a value when at least half a window is present.
//!   Used for the weight series, where days without a reading are `None`.

/// Strict trailing SMA; the first `period - 1` positions are `None`
pub fn sma(series: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; series.len()];
    }

    let mut out = Vec::with_capacity(series.len());
    let mut window_sum = 0.0;

    for (i, value) in series.iter().enumerate() {
        window_sum += value;
        if i >= period {
            window_sum -= series[i - period];
        }
        if i + 1 >= period {
            out.push(Some(window_sum / period as f64));
        } else {
            out.push(None);
        }
    }

    out
}

/// Half-window tolerant trailing SMA over a series with gaps
pub fn sma_sparse(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; series.len()];
    }

    let required = period.div_ceil(2);

    (0..series.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(period);
            let present: Vec<f64> = series[start..=i].iter().flatten().copied().collect();
            if present.len() >= required {
                Some(present.iter().sum::<f64>() / present.len() as f64)
            } else {
                None
            }
        })
        .collect()
}
