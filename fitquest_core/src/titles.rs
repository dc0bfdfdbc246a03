//! Level titles.

/// Title thresholds, highest first. The first entry whose minimum level is
/// reached wins.
const TITLE_THRESHOLDS: &[(u32, &str)] = &[
    (50, "Legendary Master"),
    (40, "Elite Performer"),
    (30, "Movement Master"),
    (20, "Strength Adept"),
    (15, "Dedicated Athlete"),
    (10, "Skill Initiate"),
    (5, "Active Member"),
];

const BASE_TITLE: &str = "Novice";

/// Map a level to its display title
pub fn get_title(level: u32) -> &'static str {
    TITLE_THRESHOLDS
        .iter()
        .find(|(min_level, _)| level >= *min_level)
        .map(|(_, title)| *title)
        .unwrap_or(BASE_TITLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_boundaries() {
        assert_eq!(get_title(0), "Novice");
        assert_eq!(get_title(1), "Novice");
        assert_eq!(get_title(4), "Novice");
        assert_eq!(get_title(5), "Active Member");
        assert_eq!(get_title(10), "Skill Initiate");
        assert_eq!(get_title(11), "Skill Initiate");
        assert_eq!(get_title(14), "Skill Initiate");
        assert_eq!(get_title(15), "Dedicated Athlete");
        assert_eq!(get_title(20), "Strength Adept");
        assert_eq!(get_title(30), "Movement Master");
        assert_eq!(get_title(40), "Elite Performer");
        assert_eq!(get_title(49), "Elite Performer");
        assert_eq!(get_title(50), "Legendary Master");
        assert_eq!(get_title(500), "Legendary Master");
        assert_ne!(get_title(49), get_title(50));
    }

    #[test]
    fn test_title_prestige_never_drops() {
        let rank = |title: &str| {
            TITLE_THRESHOLDS
                .iter()
                .rev()
                .position(|(_, t)| *t == title)
                .map(|p| p + 1)
                .unwrap_or(0)
        };

        let mut previous = rank(get_title(1));
        for level in 2..=120 {
            let current = rank(get_title(level));
            assert!(current >= previous, "title regressed at level {}", level);
            previous = current;
        }
    }
}
