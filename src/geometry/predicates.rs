//! Geometric predicates for planar point configurations.
//!
//! The orientation and in-circle tests evaluate the classic determinants on
//! coordinates translated to the last argument, and classify the sign against an
//! error bound that scales with the magnitude of the operands. A determinant
//! inside the error bound is reported as degenerate (`DEGENERATE` / `BOUNDARY`)
//! rather than guessed.
//!
//! # References
//!
//! - **Shewchuk, J.R.** "Adaptive precision floating-point arithmetic and fast robust
//!   geometric predicates." *Discrete & Computational Geometry* 18.3 (1997): 305-363.
//!   DOI: [10.1007/PL00009321](https://doi.org/10.1007/PL00009321)

use crate::geometry::point::Point;

/// Relative error bound of the orientation determinant (Shewchuk's `ccwerrboundA`).
const ORIENT_ERROR_BOUND: f64 = (3.0 + 16.0 * f64::EPSILON) * f64::EPSILON;

/// Relative error bound of the in-circle determinant (Shewchuk's `iccerrboundA`).
const INCIRCLE_ERROR_BOUND: f64 = (10.0 + 96.0 * f64::EPSILON) * f64::EPSILON;

/// Represents the position of a point relative to a circumcircle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InCircle {
    /// The point is outside the circumcircle
    OUTSIDE,
    /// The point is on the circumcircle (within numerical tolerance)
    BOUNDARY,
    /// The point is inside the circumcircle
    INSIDE,
}

impl std::fmt::Display for InCircle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OUTSIDE => write!(f, "OUTSIDE"),
            Self::BOUNDARY => write!(f, "BOUNDARY"),
            Self::INSIDE => write!(f, "INSIDE"),
        }
    }
}

/// Represents the orientation of a point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Clockwise turn (determinant < 0)
    NEGATIVE,
    /// Collinear within numerical tolerance
    DEGENERATE,
    /// Counter-clockwise turn (determinant > 0)
    POSITIVE,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

/// Determine the orientation of the triple `(a, b, c)`.
///
/// Evaluates
///
/// ```text
/// | ax-cx  ay-cy |
/// | bx-cx  by-cy |
/// ```
///
/// `POSITIVE` means `c` lies to the left of the directed line `a -> b`
/// (counter-clockwise triangle).
///
/// # Example
///
/// ```
/// use cellbound::geometry::point::Point;
/// use cellbound::geometry::predicates::{Orientation, orientation};
///
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(1.0, 0.0);
/// assert_eq!(orientation(&a, &b, &Point::new(0.0, 1.0)), Orientation::POSITIVE);
/// assert_eq!(orientation(&a, &b, &Point::new(2.0, 0.0)), Orientation::DEGENERATE);
/// ```
#[must_use]
pub fn orientation(a: &Point, b: &Point, c: &Point) -> Orientation {
    let det_left = (a.x() - c.x()) * (b.y() - c.y());
    let det_right = (a.y() - c.y()) * (b.x() - c.x());
    let det = det_left - det_right;
    let tolerance = ORIENT_ERROR_BOUND * (det_left.abs() + det_right.abs());

    if det > tolerance {
        Orientation::POSITIVE
    } else if det < -tolerance {
        Orientation::NEGATIVE
    } else {
        Orientation::DEGENERATE
    }
}

/// Test whether `d` lies inside the circumcircle of the triangle `(a, b, c)`.
///
/// The triangle may have either orientation; the determinant sign is
/// interpreted against [`orientation`] of `(a, b, c)`. A degenerate triangle has
/// no circumcircle and yields `BOUNDARY`.
///
/// # Example
///
/// ```
/// use cellbound::geometry::point::Point;
/// use cellbound::geometry::predicates::{InCircle, incircle};
///
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(2.0, 0.0);
/// let c = Point::new(0.0, 2.0);
/// assert_eq!(incircle(&a, &b, &c, &Point::new(0.5, 0.5)), InCircle::INSIDE);
/// assert_eq!(incircle(&a, &b, &c, &Point::new(2.0, 2.0)), InCircle::BOUNDARY);
/// assert_eq!(incircle(&a, &b, &c, &Point::new(5.0, 5.0)), InCircle::OUTSIDE);
/// ```
#[must_use]
pub fn incircle(a: &Point, b: &Point, c: &Point, d: &Point) -> InCircle {
    let sign = match orientation(a, b, c) {
        Orientation::POSITIVE => 1.0,
        Orientation::NEGATIVE => -1.0,
        Orientation::DEGENERATE => return InCircle::BOUNDARY,
    };

    let (adx, ady) = (a.x() - d.x(), a.y() - d.y());
    let (bdx, bdy) = (b.x() - d.x(), b.y() - d.y());
    let (cdx, cdy) = (c.x() - d.x(), c.y() - d.y());

    let alift = adx.mul_add(adx, ady * ady);
    let blift = bdx.mul_add(bdx, bdy * bdy);
    let clift = cdx.mul_add(cdx, cdy * cdy);

    let (bdxcdy, cdxbdy) = (bdx * cdy, cdx * bdy);
    let (cdxady, adxcdy) = (cdx * ady, adx * cdy);
    let (adxbdy, bdxady) = (adx * bdy, bdx * ady);

    let det = alift * (bdxcdy - cdxbdy) + blift * (cdxady - adxcdy) + clift * (adxbdy - bdxady);
    let permanent = (bdxcdy.abs() + cdxbdy.abs()) * alift
        + (cdxady.abs() + adxcdy.abs()) * blift
        + (adxbdy.abs() + bdxady.abs()) * clift;
    let tolerance = INCIRCLE_ERROR_BOUND * permanent;

    let oriented = det * sign;
    if oriented > tolerance {
        InCircle::INSIDE
    } else if oriented < -tolerance {
        InCircle::OUTSIDE
    } else {
        InCircle::BOUNDARY
    }
}

// =============================================================================
// TESTS
// =============================================================================
