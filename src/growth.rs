//! Capacity policy shared by the diagnostics buffer and the streaming reader.

/// Past this size, buffers grow by this fixed amount instead of doubling.
pub(crate) const MAX_DOUBLING_SIZE: usize = 128 * 1024 * 1024;

/// Next capacity after `current`, or `None` on arithmetic overflow.
pub(crate) fn next_capacity(current: usize) -> Option<usize> {
    if current >= MAX_DOUBLING_SIZE {
        current.checked_add(MAX_DOUBLING_SIZE)
    } else {
        current.checked_mul(2)
    }
}

/// Smallest capacity of the growth sequence from `current` that holds `needed`.
///
/// An empty buffer jumps straight to `needed`.
pub(crate) fn capacity_for(current: usize, needed: usize) -> Option<usize> {
    if needed <= current {
        return Some(current);
    }
    if current == 0 {
        return Some(needed);
    }
    Some(next_capacity(current)?.max(needed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_below_cap() {
        assert_eq!(next_capacity(1024), Some(2048));
        assert_eq!(next_capacity(1), Some(2));
    }

    #[test]
    fn additive_past_cap() {
        assert_eq!(
            next_capacity(MAX_DOUBLING_SIZE),
            Some(2 * MAX_DOUBLING_SIZE)
        );
        assert_eq!(
            next_capacity(3 * MAX_DOUBLING_SIZE),
            Some(4 * MAX_DOUBLING_SIZE)
        );
    }

    #[test]
    fn overflow_is_none() {
        assert_eq!(next_capacity(usize::MAX - 1), None);
    }

    #[test]
    fn capacity_for_first_growth_is_exact() {
        assert_eq!(capacity_for(0, 37), Some(37));
    }

    #[test]
    fn capacity_for_takes_larger_of_step_and_need() {
        assert_eq!(capacity_for(10, 15), Some(20));
        assert_eq!(capacity_for(10, 50), Some(50));
        assert_eq!(capacity_for(10, 5), Some(10));
    }
}
