//! Membership functions shared by the type-1 and interval type-2 pipelines.

use crate::error::{FuzzyError, Result};
use crate::math::interp;

/// Slack allowed when comparing a lower membership against its upper membership.
const FOOTPRINT_TOLERANCE: f64 = 1e-12;

/// Which half of a [`Shape::Gauangle`] follows the Gaussian curve.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Left,
    Right,
}

/// The closed set of supported shapes, each with unit height.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Zero outside `[left, right]`, one at `peak`.
    Triangular { left: f64, peak: f64, right: f64 },
    /// Zero outside `[left, right]`, one on `[left_top, right_top]`.
    Trapezoidal {
        left: f64,
        left_top: f64,
        right_top: f64,
        right: f64,
    },
    Gaussian { mean: f64, sigma: f64 },
    /// A Gaussian half on `gaussian_side` of the mean and a linear flank on the
    /// other side that reaches zero `spread` away from the mean.
    Gauangle {
        mean: f64,
        sigma: f64,
        spread: f64,
        gaussian_side: Side,
    },
}

impl Shape {
    fn evaluate(&self, x: f64) -> f64 {
        match *self {
            Self::Triangular { left, peak, right } => interp(x, &[(left, 0.), (peak, 1.), (right, 0.)]),
            Self::Trapezoidal {
                left,
                left_top,
                right_top,
                right,
            } => interp(x, &[(left, 0.), (left_top, 1.), (right_top, 1.), (right, 0.)]),
            Self::Gaussian { mean, sigma } => gaussian(x, mean, sigma),
            Self::Gauangle {
                mean,
                sigma,
                spread,
                gaussian_side,
            } => match gaussian_side {
                Side::Left if x <= mean => gaussian(x, mean, sigma),
                Side::Right if x >= mean => gaussian(x, mean, sigma),
                Side::Left => interp(x, &[(mean, 1.), (mean + spread, 0.)]),
                Side::Right => interp(x, &[(mean - spread, 0.), (mean, 1.)]),
            },
        }
    }

    fn peak(&self) -> f64 {
        match *self {
            Self::Triangular { peak, .. } => peak,
            Self::Trapezoidal {
                left_top, right_top, ..
            } => (left_top + right_top) / 2.,
            Self::Gaussian { mean, .. } | Self::Gauangle { mean, .. } => mean,
        }
    }

    fn breakpoints(&self) -> Vec<f64> {
        match *self {
            Self::Triangular { left, peak, right } => vec![left, peak, right],
            Self::Trapezoidal {
                left,
                left_top,
                right_top,
                right,
            } => vec![left, left_top, right_top, right],
            Self::Gaussian { mean, sigma } => vec![mean - sigma, mean, mean + sigma],
            Self::Gauangle { mean, spread, .. } => vec![mean - spread, mean, mean + spread],
        }
    }
}

fn gaussian(x: f64, mean: f64, sigma: f64) -> f64 {
    (-(x - mean).powi(2) / (2. * sigma.powi(2))).exp()
}

fn ensure_ordered(kind: &str, params: &[f64]) -> Result<()> {
    if params.iter().any(|p| !p.is_finite()) {
        return Err(FuzzyError::MalformedMembershipFunction(format!(
            "{kind} parameters {params:?} must be finite"
        )));
    }

    if params.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(FuzzyError::MalformedMembershipFunction(format!(
            "{kind} parameters {params:?} must be non-decreasing"
        )));
    }

    Ok(())
}

fn ensure_spread(kind: &str, name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0. {
        Ok(())
    } else {
        Err(FuzzyError::MalformedMembershipFunction(format!(
            "{kind} {name} must be positive and finite, got {value}"
        )))
    }
}

/// A [`Shape`] scaled to a maximum membership in `(0, 1]`.
///
/// Every constructor validates its parameters, so a value of this type always
/// evaluates to a degree in `[0, scale]`.
#[derive(Clone, Debug, PartialEq)]
pub struct MembershipFunction {
    shape: Shape,
    scale: f64,
}

impl MembershipFunction {
    fn unit(shape: Shape) -> Self {
        Self { shape, scale: 1. }
    }

    pub fn triangular(left: f64, peak: f64, right: f64) -> Result<Self> {
        ensure_ordered("triangular", &[left, peak, right])?;

        Ok(Self::unit(Shape::Triangular { left, peak, right }))
    }

    pub fn trapezoidal(left: f64, left_top: f64, right_top: f64, right: f64) -> Result<Self> {
        ensure_ordered("trapezoidal", &[left, left_top, right_top, right])?;

        Ok(Self::unit(Shape::Trapezoidal {
            left,
            left_top,
            right_top,
            right,
        }))
    }

    pub fn gaussian(mean: f64, sigma: f64) -> Result<Self> {
        ensure_ordered("gaussian", &[mean])?;
        ensure_spread("gaussian", "sigma", sigma)?;

        Ok(Self::unit(Shape::Gaussian { mean, sigma }))
    }

    /// A spread of zero turns the linear flank into a vertical edge.
    pub fn gauangle(mean: f64, sigma: f64, spread: f64, gaussian_side: Side) -> Result<Self> {
        ensure_ordered("gauangle", &[mean])?;
        ensure_spread("gauangle", "sigma", sigma)?;

        if !(spread.is_finite() && spread >= 0.) {
            return Err(FuzzyError::MalformedMembershipFunction(format!(
                "gauangle spread must be non-negative and finite, got {spread}"
            )));
        }

        Ok(Self::unit(Shape::Gauangle {
            mean,
            sigma,
            spread,
            gaussian_side,
        }))
    }

    /// Compresses the whole shape so that its maximum membership is `scale`.
    /// Used for the lower halves of interval type-2 sets.
    pub fn scaled(self, scale: f64) -> Result<Self> {
        if !(scale > 0. && scale <= 1.) {
            return Err(FuzzyError::MalformedMembershipFunction(format!(
                "scale must lie in (0, 1], got {scale}"
            )));
        }

        Ok(Self { scale, ..self })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.scale * self.shape.evaluate(x)
    }

    /// The point of maximum membership, used by height defuzzification.
    pub fn peak(&self) -> f64 {
        self.shape.peak()
    }

    pub(crate) fn breakpoints(&self) -> Vec<f64> {
        self.shape.breakpoints()
    }
}

/// A pair of memberships with `lower <= upper`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

/// An interval type-2 fuzzy set: the region between `upper` and `lower` is its
/// footprint of uncertainty.
#[derive(Clone, Debug, PartialEq)]
pub struct IntervalMf {
    upper: MembershipFunction,
    lower: MembershipFunction,
}

impl IntervalMf {
    /// Checks the footprint at the breakpoints of both halves. Rulebases check
    /// it again over the sampled domain of the variable the set is bound to.
    pub fn new(upper: MembershipFunction, lower: MembershipFunction) -> Result<Self> {
        let this = Self { upper, lower };
        let breakpoints: Vec<f64> = this
            .upper
            .breakpoints()
            .into_iter()
            .chain(this.lower.breakpoints())
            .collect();

        this.check_footprint(breakpoints)?;

        Ok(this)
    }

    pub fn upper(&self) -> &MembershipFunction {
        &self.upper
    }

    pub fn lower(&self) -> &MembershipFunction {
        &self.lower
    }

    pub fn evaluate(&self, x: f64) -> Interval {
        Interval {
            lower: self.lower.evaluate(x),
            upper: self.upper.evaluate(x),
        }
    }

    pub(crate) fn check_footprint(&self, points: impl IntoIterator<Item = f64>) -> Result<()> {
        for x in points {
            let Interval { lower, upper } = self.evaluate(x);

            if lower > upper + FOOTPRINT_TOLERANCE {
                return Err(FuzzyError::MalformedMembershipFunction(format!(
                    "lower membership {lower} exceeds upper membership {upper} at x = {x}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trapezoidal_boundaries() {
        let mf = MembershipFunction::trapezoidal(1., 3., 5., 9.).unwrap();

        assert_eq!(mf.evaluate(1.), 0.);
        assert_eq!(mf.evaluate(3.), 1.);
        assert_eq!(mf.evaluate(5.), 1.);
        assert_eq!(mf.evaluate(9.), 0.);
        assert_eq!(mf.evaluate(2.), 0.5);
        assert_eq!(mf.evaluate(7.), 0.5);
        assert_eq!(mf.evaluate(-4.), 0.);
        assert_eq!(mf.evaluate(12.), 0.);
        assert_eq!(mf.peak(), 4.);
    }

    #[test]
    fn test_trapezoidal_shoulder() {
        let mf = MembershipFunction::trapezoidal(0., 0., 2., 4.).unwrap();

        assert_eq!(mf.evaluate(0.), 1.);
        assert_eq!(mf.evaluate(1.), 1.);
        assert_eq!(mf.evaluate(3.), 0.5);
        assert_eq!(mf.evaluate(4.), 0.);

        let right = MembershipFunction::trapezoidal(4., 6., 10., 10.).unwrap();

        assert_eq!(right.evaluate(10.), 1.);
        assert_eq!(right.evaluate(5.), 0.5);
    }

    #[test]
    fn test_trapezoidal_linear_rise() {
        let mf = MembershipFunction::trapezoidal(0., 2., 2., 4.).unwrap();

        assert_eq!(mf.evaluate(1.), 0.5);
        assert_eq!(mf.evaluate(2.), 1.);
    }

    #[test]
    fn test_triangular() {
        let mf = MembershipFunction::triangular(2., 4., 6.).unwrap();

        assert_eq!(mf.evaluate(4.), 1.);
        assert_eq!(mf.evaluate(3.), 0.5);
        assert_eq!(mf.evaluate(5.), 0.5);
        assert_eq!(mf.evaluate(2.), 0.);
        assert_eq!(mf.evaluate(6.), 0.);
        assert_eq!(mf.peak(), 4.);

        let skewed = MembershipFunction::triangular(0., 2., 10.).unwrap();

        assert_eq!(skewed.evaluate(2.), 1.);
        assert_eq!(skewed.evaluate(1.), 0.5);
        assert!(skewed.evaluate(3.) > skewed.evaluate(1.));
    }

    #[test]
    fn test_zero_width_segments() {
        let low = MembershipFunction::triangular(0., 0., 5.).unwrap();
        let high = MembershipFunction::triangular(5., 10., 10.).unwrap();
        let spike = MembershipFunction::triangular(3., 3., 3.).unwrap();

        assert_eq!(low.evaluate(0.), 1.);
        assert_eq!(high.evaluate(10.), 1.);
        assert_eq!(spike.evaluate(3.), 1.);
        assert_eq!(spike.evaluate(3.5), 0.);
        assert!(low.evaluate(0.).is_finite());
    }

    #[test]
    fn test_gaussian() {
        let mf = MembershipFunction::gaussian(5., 2.).unwrap();

        assert_eq!(mf.evaluate(5.), 1.);
        assert!((mf.evaluate(7.) - (-0.5f64).exp()).abs() < 1e-12);
        assert_eq!(mf.evaluate(3.), mf.evaluate(7.));
        assert_eq!(mf.peak(), 5.);
    }

    #[test]
    fn test_gauangle() {
        let mf = MembershipFunction::gauangle(5., 1., 2., Side::Left).unwrap();

        assert_eq!(mf.evaluate(5.), 1.);
        assert!((mf.evaluate(4.) - (-0.5f64).exp()).abs() < 1e-12);
        assert_eq!(mf.evaluate(6.), 0.5);
        assert_eq!(mf.evaluate(7.), 0.);
        assert_eq!(mf.evaluate(9.), 0.);

        let mirrored = MembershipFunction::gauangle(5., 1., 2., Side::Right).unwrap();

        assert_eq!(mirrored.evaluate(4.), 0.5);
        assert_eq!(mirrored.evaluate(6.), mf.evaluate(4.));

        let edge = MembershipFunction::gauangle(5., 1., 0., Side::Left).unwrap();

        assert_eq!(edge.evaluate(5.), 1.);
        assert_eq!(edge.evaluate(5.01), 0.);
    }

    #[test]
    fn test_scaled() {
        let mf = MembershipFunction::trapezoidal(0., 0., 1.5, 3.5).unwrap().scaled(0.9).unwrap();

        assert_eq!(mf.evaluate(1.), 0.9);
        assert!((mf.evaluate(2.5) - 0.45).abs() < 1e-12);
        assert_eq!(mf.evaluate(3.5), 0.);
        assert_eq!(mf.scale(), 0.9);
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            MembershipFunction::triangular(3., 2., 4.),
            Err(FuzzyError::MalformedMembershipFunction(_))
        ));
        assert!(MembershipFunction::trapezoidal(0., 2., 1., 4.).is_err());
        assert!(MembershipFunction::trapezoidal(0., f64::NAN, 1., 4.).is_err());
        assert!(MembershipFunction::gaussian(0., 0.).is_err());
        assert!(MembershipFunction::gaussian(f64::INFINITY, 1.).is_err());
        assert!(MembershipFunction::gauangle(0., 1., -1., Side::Left).is_err());

        let mf = MembershipFunction::triangular(0., 1., 2.).unwrap();

        assert!(mf.clone().scaled(0.).is_err());
        assert!(mf.clone().scaled(1.5).is_err());
        assert!(mf.scaled(f64::NAN).is_err());
    }

    #[test]
    fn test_interval_mf() {
        let upper = MembershipFunction::trapezoidal(0., 0., 2.5, 4.5).unwrap();
        let lower = MembershipFunction::trapezoidal(0., 0., 1.5, 3.5)
            .unwrap()
            .scaled(0.9)
            .unwrap();
        let set = IntervalMf::new(upper, lower).unwrap();

        assert_eq!(set.evaluate(1.), Interval { lower: 0.9, upper: 1. });
        assert_eq!(set.evaluate(4.), Interval { lower: 0., upper: 0.25 });
    }

    #[test]
    fn test_interval_mf_rejects_crossing() {
        let upper = MembershipFunction::trapezoidal(0., 0., 1.5, 3.5).unwrap();
        let lower = MembershipFunction::trapezoidal(0., 0., 2.5, 4.5).unwrap();

        assert!(matches!(
            IntervalMf::new(upper, lower),
            Err(FuzzyError::MalformedMembershipFunction(_))
        ));
    }
}
