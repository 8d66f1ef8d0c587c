use crate::types::Source;

/// What to do with an incoming value for an already-known parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Overwrite the stored value.
    Accept,
    /// A higher-priority value is stored; drop the incoming one silently.
    Keep,
    /// Same priority as the stored value; drop the incoming one with a warning.
    Duplicate,
}

/// Decide whether a value at `priority` may replace the one described by `current`.
/// Origin plays no part: only priorities are compared.
pub fn decide(current: Source, priority: u32) -> Decision {
    match current {
        Source::Unset => Decision::Accept,
        Source::SetBy { priority: stored, .. } if stored > priority => Decision::Keep,
        Source::SetBy { priority: stored, .. } if stored == priority => Decision::Duplicate,
        Source::SetBy { .. } => Decision::Accept,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Origin;

    fn set(origin: Origin, priority: u32) -> Source {
        Source::SetBy { origin, priority }
    }

    #[test]
    fn unset_accepts_anything() {
        assert_eq!(decide(Source::Unset, 1), Decision::Accept);
        assert_eq!(decide(Source::Unset, u32::MAX), Decision::Accept);
    }

    #[test]
    fn higher_incoming_priority_wins() {
        assert_eq!(decide(set(Origin::File, 1), 5), Decision::Accept);
    }

    #[test]
    fn lower_incoming_priority_is_kept_out() {
        assert_eq!(decide(set(Origin::Cli, 5), 1), Decision::Keep);
    }

    #[test]
    fn equal_priority_is_duplicate_regardless_of_origin() {
        assert_eq!(decide(set(Origin::Cli, 3), 3), Decision::Duplicate);
        assert_eq!(decide(set(Origin::File, 3), 3), Decision::Duplicate);
    }

    #[test]
    fn order_of_sources_does_not_matter() {
        // CLI at 5 then file at 1, or file at 1 then CLI at 5: CLI ends up stored.
        assert_eq!(decide(set(Origin::Cli, 5), 1), Decision::Keep);
        assert_eq!(decide(set(Origin::File, 1), 5), Decision::Accept);
    }
}
