use num_traits::{Float, FromPrimitive};

/// Returns `n` evenly spaced values from `y_start` to `y_end`,
/// both inclusive.
///
/// Each value is computed directly from its index, so the endpoints
/// are exact.
pub fn linspace<T>(y_start: T, y_end: T, n: usize) -> impl Iterator<Item = T>
where
    T: Float + FromPrimitive,
{
    let steps = T::from_usize(n.saturating_sub(1).max(1)).unwrap_or_else(T::nan);
    let dy = y_end - y_start;
    (0..n).map(move |x| {
        let x = T::from_usize(x).unwrap_or_else(T::nan);
        y_start + dy * x / steps
    })
}

#[cfg(test)]
mod tests {
    use super::linspace;

    #[test]
    fn test_linspace() {
        let v: Vec<f64> = linspace(350_100.0, 350_600.0, 6).collect();
        assert_eq!(
            v,
            [350_100.0, 350_200.0, 350_300.0, 350_400.0, 350_500.0, 350_600.0]
        );

        let v: Vec<f32> = linspace(1.0, -1.0, 3).collect();
        assert_eq!(v, [1.0, 0.0, -1.0]);
    }

    #[test]
    fn test_degenerate_lengths() {
        assert_eq!(linspace(5.0_f64, 7.0, 0).count(), 0);
        assert_eq!(linspace(5.0_f64, 7.0, 1).collect::<Vec<_>>(), [5.0]);
    }
}
