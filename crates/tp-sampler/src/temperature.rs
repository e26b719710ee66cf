/// Smallest temperature ever used to scale scores.
///
/// Zero, negative and NaN temperatures are silently raised to this floor so
/// that scaling never divides by zero. The resulting distribution is very
/// sharp but never exactly one-hot; exact greedy behavior is a separate
/// policy, see [`crate::chooser::GREEDY_THRESHOLD`].
pub const MIN_TEMPERATURE: f32 = 1e-3;

/// Clamp a caller-supplied temperature to [`MIN_TEMPERATURE`].
pub fn clamp_temperature(temperature: f32) -> f32 {
    // NaN fails the comparison and is floored too.
    if temperature >= MIN_TEMPERATURE {
        temperature
    } else {
        MIN_TEMPERATURE
    }
}
