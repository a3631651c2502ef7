use std::collections::HashSet;
use std::hash::Hash;

/// Removes repeats while keeping the first occurrence of every value in place.
pub fn dedup_stable<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_occurrence_order() {
        let out = dedup_stable(["grd", "mlc", "grd", "kmz", "mlc"]);
        assert_eq!(out, vec!["grd", "mlc", "kmz"]);
    }

    #[test]
    fn idempotent() {
        let once = dedup_stable(vec![3, 1, 3, 2, 1]);
        let twice = dedup_stable(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_input() {
        let out: Vec<String> = dedup_stable(Vec::new());
        assert!(out.is_empty());
    }
}
