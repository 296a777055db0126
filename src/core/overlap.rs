use crate::models::TagSet;

/// Tags present in both sets, in sorted order
#[inline]
pub fn shared_tags<'a>(desired: &'a TagSet, offered: &'a TagSet) -> Vec<&'a str> {
    desired
        .intersection(offered)
        .map(String::as_str)
        .collect()
}

/// |desired ∩ offered| / |desired|
///
/// Returns 0.0 when nothing is desired.
#[inline]
pub fn overlap_ratio(desired: &TagSet, offered: &TagSet) -> f64 {
    if desired.is_empty() {
        return 0.0;
    }

    let shared = desired.intersection(offered).count();
    shared as f64 / desired.len() as f64
}

#[inline]
pub fn has_overlap(a: &TagSet, b: &TagSet) -> bool {
    a.intersection(b).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> TagSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_overlap_ratio() {
        let desired = tags(&["anxiety", "trauma"]);
        let offered = tags(&["anxiety", "grief", "ocd"]);

        assert_eq!(overlap_ratio(&desired, &offered), 0.5);
        assert_eq!(overlap_ratio(&offered, &desired), 1.0 / 3.0);
    }

    #[test]
    fn test_overlap_ratio_empty_desired() {
        assert_eq!(overlap_ratio(&TagSet::new(), &tags(&["anxiety"])), 0.0);
    }

    #[test]
    fn test_shared_tags_sorted() {
        let desired = tags(&["trauma", "anxiety", "grief"]);
        let offered = tags(&["grief", "anxiety"]);

        assert_eq!(shared_tags(&desired, &offered), vec!["anxiety", "grief"]);
        assert!(has_overlap(&desired, &offered));
        assert!(!has_overlap(&desired, &tags(&["ocd"])));
    }

    fn reasons_from(desired: &TagSet, offered: &TagSet) -> Vec<String> {
        shared_tags(desired, offered)
            .into_iter()
            .map(|tag| format!("Shares {}", tag))
            .collect()
    }

    #[test]
    fn test_shared_tags_through_borrowed_sets() {
        let desired = tags(&["depression", "ocd"]);
        let offered = tags(&["ocd", "trauma"]);

        assert_eq!(reasons_from(&desired, &offered), vec!["Shares ocd"]);
        assert!(shared_tags(&desired, &TagSet::new()).is_empty());
    }
}
