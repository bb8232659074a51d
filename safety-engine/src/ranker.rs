//! Pure filtering and ranking of a post snapshot.

use safety_core::{CategoryFilter, Post, ResolvedLocation};

/// Posts for one location and category, newest first.
///
/// A post belongs to the location only when its `location_address` equals
/// [`ResolvedLocation::match_key`] exactly. `Hot` keeps every post whose
/// view count ties the maximum of the location-matched set. The sort is
/// stable, so equal timestamps keep source order.
pub fn filter_feed(
    posts: &[Post],
    location: Option<&ResolvedLocation>,
    filter: &CategoryFilter,
) -> Vec<Post> {
    let Some(location) = location else {
        return Vec::new();
    };

    let match_key = location.match_key();
    let nearby: Vec<&Post> = posts
        .iter()
        .filter(|post| post.location_address == match_key)
        .collect();

    let mut selected: Vec<Post> = match filter {
        CategoryFilter::All => nearby.into_iter().cloned().collect(),
        CategoryFilter::Hot => {
            let max_views = nearby.iter().map(|post| post.views).max().unwrap_or(0);
            nearby
                .into_iter()
                .filter(|post| post.views == max_views)
                .cloned()
                .collect()
        }
        CategoryFilter::Only(category) => nearby
            .into_iter()
            .filter(|post| &post.category == category)
            .cloned()
            .collect(),
    };

    selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    selected
}

/// The most viewed post of the whole collection, ignoring location and
/// category. Ties go to the first post in collection order.
pub fn global_hot_pick(posts: &[Post]) -> Option<&Post> {
    posts.iter().fold(None, |best: Option<&Post>, post| match best {
        Some(current) if current.views >= post.views => Some(current),
        _ => Some(post),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use safety_core::Category;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 9, minute, 0).unwrap()
    }

    fn post(id: &str, category: Category, address: &str, views: u64, minute: u32) -> Post {
        Post {
            id: id.to_string(),
            category,
            title: format!("title {}", id),
            message: format!("message {}", id),
            timestamp: at(minute),
            views,
            comment_count: 0,
            location_address: address.to_string(),
            image: None,
        }
    }

    fn gangnam() -> ResolvedLocation {
        ResolvedLocation::new("Seoul", "Gangnam")
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|post| post.id.as_str()).collect()
    }

    fn sample() -> Vec<Post> {
        vec![
            post("1", Category::Traffic, "Seoul, Gangnam", 10, 1),
            post("2", Category::Disaster, "Seoul, Mapo", 99, 2),
            post("3", Category::Traffic, "Seoul, Gangnam", 20, 3),
            post("4", Category::Caution, "Seoul, Gangnam", 5, 4),
            post("5", Category::Protest, "Busan, Haeundae", 40, 5),
        ]
    }

    #[test]
    fn test_all_keeps_exact_location_matches_newest_first() {
        let result = filter_feed(&sample(), Some(&gangnam()), &CategoryFilter::All);
        assert_eq!(ids(&result), vec!["4", "3", "1"]);
        assert!(result
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    }

    #[test]
    fn test_hot_keeps_only_max_views() {
        let posts = vec![
            post("a", Category::Traffic, "Seoul, Gangnam", 10, 1),
            post("b", Category::Traffic, "Seoul, Gangnam", 20, 2),
        ];
        let result = filter_feed(&posts, Some(&gangnam()), &CategoryFilter::Hot);
        assert_eq!(ids(&result), vec!["b"]);
    }

    #[test]
    fn test_hot_keeps_every_tie() {
        let posts = vec![
            post("a", Category::Traffic, "Seoul, Gangnam", 20, 1),
            post("b", Category::Caution, "Seoul, Gangnam", 7, 2),
            post("c", Category::Disaster, "Seoul, Gangnam", 20, 3),
            post("d", Category::Disaster, "Seoul, Mapo", 500, 4),
        ];
        let all = filter_feed(&posts, Some(&gangnam()), &CategoryFilter::All);
        let hot = filter_feed(&posts, Some(&gangnam()), &CategoryFilter::Hot);
        assert_eq!(ids(&hot), vec!["c", "a"]);

        let max_views = all.iter().map(|p| p.views).max().unwrap();
        assert!(hot.iter().all(|p| p.views == max_views && all.contains(p)));
    }

    #[test]
    fn test_category_filter() {
        let result = filter_feed(
            &sample(),
            Some(&gangnam()),
            &CategoryFilter::Only(Category::Traffic),
        );
        assert_eq!(ids(&result), vec!["3", "1"]);

        let none = filter_feed(
            &sample(),
            Some(&gangnam()),
            &CategoryFilter::Only(Category::Protest),
        );
        assert!(none.is_empty());
    }

    #[test]
    fn test_empty_inputs_give_empty_output() {
        for filter in [
            CategoryFilter::All,
            CategoryFilter::Hot,
            CategoryFilter::Only(Category::Traffic),
        ] {
            assert!(filter_feed(&[], Some(&gangnam()), &filter).is_empty());
            assert!(filter_feed(&sample(), None, &filter).is_empty());
        }
    }

    #[test]
    fn test_equal_timestamps_keep_source_order() {
        let posts = vec![
            post("first", Category::Traffic, "Seoul, Gangnam", 1, 5),
            post("second", Category::Caution, "Seoul, Gangnam", 1, 5),
            post("third", Category::Disaster, "Seoul, Gangnam", 1, 5),
        ];
        let result = filter_feed(&posts, Some(&gangnam()), &CategoryFilter::All);
        assert_eq!(ids(&result), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let location = gangnam();
        for filter in [CategoryFilter::All, CategoryFilter::Hot] {
            let once = filter_feed(&sample(), Some(&location), &filter);
            let twice = filter_feed(&once, Some(&location), &filter);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_address_format_contract() {
        let posts = vec![
            post("space", Category::Traffic, "Seoul Gangnam", 1, 1),
            post("no-space", Category::Traffic, "Seoul,Gangnam", 1, 2),
            post("lower", Category::Traffic, "seoul, gangnam", 1, 3),
            post("exact", Category::Traffic, "Seoul, Gangnam", 1, 4),
        ];
        let result = filter_feed(&posts, Some(&gangnam()), &CategoryFilter::All);
        assert_eq!(ids(&result), vec!["exact"]);

        // The cache form round-trips into the same match key
        let cached = ResolvedLocation::from_cache_form(&gangnam().cache_form());
        assert_eq!(cached.match_key(), "Seoul, Gangnam");
    }

    #[test]
    fn test_global_hot_pick_ignores_location_and_prefers_first_tie() {
        let posts = sample();
        assert_eq!(global_hot_pick(&posts).map(|p| p.id.as_str()), Some("2"));

        let tied = vec![
            post("x", Category::Traffic, "Seoul, Gangnam", 30, 1),
            post("y", Category::Caution, "Seoul, Mapo", 30, 2),
        ];
        assert_eq!(global_hot_pick(&tied).map(|p| p.id.as_str()), Some("x"));
        assert!(global_hot_pick(&[]).is_none());
    }
}
