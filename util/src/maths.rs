//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value into the inclusive range `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Wrap an angle into the range (-pi, pi].
pub fn wrap_to_pi<T>(value: T) -> T
where
    T: Float + std::ops::Rem
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);
    let tau_t: T = pi_t + pi_t;

    let wrapped = pi_t - rem_euclid(pi_t - value, tau_t);

    // rem_euclid may land on tau itself through round-off, which maps the
    // angle onto -pi instead of pi.
    if wrapped <= -pi_t {
        wrapped + tau_t
    }
    else {
        wrapped
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float + std::ops::Rem
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wrap_to_pi() {
        const PI: f64 = std::f64::consts::PI;
        const TAU: f64 = std::f64::consts::TAU;

        assert_eq!(wrap_to_pi(0f64), 0f64);
        assert!((wrap_to_pi(1f64) - 1f64).abs() < 1e-12);
        assert!((wrap_to_pi(-1f64) + 1f64).abs() < 1e-12);
        assert_eq!(wrap_to_pi(PI), PI);
        assert_eq!(wrap_to_pi(-PI), PI);
        assert!((wrap_to_pi(TAU + 1f64) - 1f64).abs() < 1e-12);
        assert!((wrap_to_pi(-TAU - 1f64) + 1f64).abs() < 1e-12);
        assert!((wrap_to_pi(3f64 * PI / 2f64) + PI / 2f64).abs() < 1e-12);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&150f64, &-100f64, &100f64), 100f64);
        assert_eq!(clamp(&-150f64, &-100f64, &100f64), -100f64);
        assert_eq!(clamp(&42f64, &-100f64, &100f64), 42f64);
    }
}
