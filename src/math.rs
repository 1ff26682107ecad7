use num::Float;

/// Similar to numpy.interp, for a single x.
///
/// `coords` must be sorted by x. Outside the covered range the nearest end value is returned. When
/// neighbouring coordinates share an x (a vertical edge) the larger y wins, so a zero-width segment
/// evaluates to its plateau instead of dividing by zero.
pub(crate) fn interp<F: Float>(x: F, coords: &[(F, F)]) -> F {
    let (Some(&(x_first, y_first)), Some(&(x_last, y_last))) = (coords.first(), coords.last()) else {
        return F::zero();
    };

    // Base cases
    if x < x_first {
        return y_first;
    }
    if x > x_last {
        return y_last;
    }

    coords
        .windows(2)
        .filter_map(|window| {
            let (x1, y1) = window[0];
            let (x2, y2) = window[1];

            if x < x1 || x > x2 {
                return None;
            }

            if x1 == x2 {
                Some(F::max(y1, y2))
            } else {
                // Actual interpolation
                Some(y1 + (x - x1) * (y2 - y1) / (x2 - x1))
            }
        })
        .reduce(F::max)
        .unwrap_or(y_last)
}

/// Σ x·w / Σ w, or `None` when the weights carry no mass.
pub(crate) fn weighted_mean<F: Float>(points: impl IntoIterator<Item = (F, F)>) -> Option<F> {
    let (num, den) = points
        .into_iter()
        .fold((F::zero(), F::zero()), |(num, den), (x, w)| (num + x * w, den + w));

    if den > F::zero() {
        Some(num / den)
    } else {
        None
    }
}

#[test]
fn test_interp() {
    let coords = [(1., 3.), (2., 2.), (3., 0.)];
    let ys: Vec<f64> = [0., 1., 1.5, 2.72, 3.24].iter().map(|x| interp(*x, &coords)).collect();

    assert_eq!(&ys[..3], &[3., 3., 2.5]);
    assert!((ys[3] - 0.56).abs() < 1e-12);
    assert_eq!(ys[4], 0.);

    let coords = [(0., 0.), (1., 2.), (2., 5.), (3., 3.), (4.5, 2.)];

    assert_eq!(interp(2.5, &coords), 4.);
    assert_eq!(interp(-1., &coords), 0.);
    assert_eq!(interp(7.5, &coords), 2.);
}

#[test]
fn test_interp_vertical_edges() {
    // Shoulder: rises instantly at 0, falls linearly to 0 at 4
    let coords = [(0., 0.), (0., 1.), (2., 1.), (4., 0.)];

    assert_eq!(interp(0., &coords), 1.);
    assert_eq!(interp(3., &coords), 0.5);
    assert_eq!(interp(-0.1, &coords), 0.);

    // Every breakpoint at the same x
    let spike = [(5., 0.), (5., 1.), (5., 0.)];

    assert_eq!(interp(5., &spike), 1.);
    assert_eq!(interp(4.9, &spike), 0.);
    assert_eq!(interp(5.1, &spike), 0.);
    assert_eq!(interp(1., &[] as &[(f64, f64)]), 0.);
}

#[test]
fn test_weighted_mean() {
    assert_eq!(weighted_mean([(0., 1.), (10., 1.)]), Some(5.));
    assert_eq!(weighted_mean([(2., 0.), (8., 3.)]), Some(8.));
    assert_eq!(weighted_mean([(2., 0.), (8., 0.)]), None);
    assert_eq!(weighted_mean(std::iter::empty::<(f64, f64)>()), None);
}
