//! Savitzky-Golay smoothing

use super::{polyfit, polyval};

/// Smooth `y` with a Savitzky-Golay filter.
///
/// Interior points take the value of a least squares polynomial of
/// `polyorder` fitted over a centred window of `window` samples. The first
/// and last half windows are evaluated from a single polynomial fitted to
/// the first/last full window. Samples are assumed equally spaced.
///
/// `window` is reduced to the largest odd length that fits the data; if no
/// window larger than `polyorder` fits, the data is returned unchanged.
pub fn savgol_filter(y: &[f64], window: usize, polyorder: usize) -> Vec<f64> {
    let n = y.len();
    let mut window = window.min(n);
    if window % 2 == 0 {
        window = window.saturating_sub(1);
    }
    if window <= polyorder {
        return y.to_vec();
    }

    let half = window / 2;
    let centred: Vec<f64> = (0..window).map(|i| i as f64 - half as f64).collect();
    let mut smoothed = y.to_vec();

    for i in half..n - half {
        if let Some(c) = polyfit(&centred, &y[i - half..=i + half], polyorder) {
            smoothed[i] = c[0];
        }
    }

    let offsets: Vec<f64> = (0..window).map(|i| i as f64).collect();
    if let Some(c) = polyfit(&offsets, &y[..window], polyorder) {
        for (i, value) in smoothed.iter_mut().enumerate().take(half) {
            *value = polyval(&c, i as f64);
        }
    }
    if let Some(c) = polyfit(&offsets, &y[n - window..], polyorder) {
        for i in n - half..n {
            smoothed[i] = polyval(&c, (i + window - n) as f64);
        }
    }

    smoothed
}
