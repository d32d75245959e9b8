//! Left recursion guard.

/// Whether the last step of `path` repeats a left-recursive cycle.
///
/// `path` is the chain of rules entered without consuming input. It is
/// circular when its last element `x` occurred before and the rules between
/// the two occurrences equal the rules right before the earlier one, i.e. the
/// path ends in `.. s x s x` for some (possibly empty) `s`.
pub(crate) fn has_circular_path<T: PartialEq>(path: &[T]) -> bool {
    let Some((last, init)) = path.split_last() else {
        return false;
    };
    let Some(previous) = init.iter().rposition(|item| item == last) else {
        return false;
    };
    let between = &init[previous + 1..];
    previous >= between.len() && init[previous - between.len()..previous] == *between
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn paths_without_repeated_cycles() {
        let empty: [&str; 0] = [];
        assert!(!has_circular_path(&empty));
        assert!(!has_circular_path(&["a"]));
        assert!(!has_circular_path(&["a", "b"]));
        assert!(!has_circular_path(&["a", "b", "a"]));
        assert!(!has_circular_path(&["a", "b", "c"]));
        assert!(!has_circular_path(&["a", "b", "c", "a"]));
        assert!(!has_circular_path(&["a", "b", "c", "a", "b"]));
        assert!(!has_circular_path(&["b", "c", "a", "b", "c"]));
        assert!(!has_circular_path(&["c", "a", "b", "c"]));
    }

    #[test]
    fn paths_with_repeated_cycles() {
        assert!(has_circular_path(&["a", "b", "c", "a", "b", "c"]));
        assert!(has_circular_path(&["a", "b", "a", "b", "a"]));
        assert!(has_circular_path(&["a", "b", "a", "b"]));
        assert!(has_circular_path(&["a", "a"]));
    }

    proptest! {
        #[test]
        fn doubled_cycle_is_detected(
            prefix in prop::collection::vec(0u8..8, 0..6),
            cycle in prop::collection::hash_set(8u8..32, 1..6),
        ) {
            let cycle: Vec<u8> = cycle.into_iter().collect();
            let mut path = prefix;
            path.extend(&cycle);
            path.extend(&cycle);
            prop_assert!(has_circular_path(&path));
        }

        #[test]
        fn distinct_rules_are_never_circular(
            path in prop::collection::hash_set(0u8..64, 0..12),
        ) {
            let path: Vec<u8> = path.into_iter().collect();
            prop_assert!(!has_circular_path(&path));
        }
    }
}
