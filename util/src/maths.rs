//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Matrix3, RealField};
use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a value to the range `[min, max]`.
///
/// NaN values are returned unchanged since they compare false against both
/// bounds.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle into the range [-pi, pi).
///
/// Works for any number of periods away from the range. Angles already in
/// range are returned untouched, so `wrap_to_pi(wrap_to_pi(a)) ==
/// wrap_to_pi(a)` holds exactly. NaN and infinite inputs produce NaN.
pub fn wrap_to_pi<T>(angle: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    if angle >= -pi_t && angle < pi_t {
        return angle;
    }

    let mut r = rem_euclid(angle + pi_t, tau_t);

    // Round-off in rem_euclid can land exactly on tau, which is the same
    // point as zero on the circle.
    if r >= tau_t {
        r = T::zero();
    }

    r - pi_t
}

/// Build the homogeneous rotation about the Z axis by `theta_rad`.
///
/// ```text
/// [[cos, -sin, 0],
///  [sin,  cos, 0],
///  [  0,    0, 1]]
/// ```
pub fn rot_mat_z<T>(theta_rad: T) -> Matrix3<T>
where
    T: RealField + Copy
{
    let (s, c) = theta_rad.sin_cos();

    Matrix3::new(
        c, -s, T::zero(),
        s, c, T::zero(),
        T::zero(), T::zero(), T::one()
    )
}
