use proptest::prelude::*;
use std::collections::HashSet;

use task_service::config::PaginationConfig;
use task_service::models::{PageRequest, TaskId};

fn pagination_config_strategy() -> impl Strategy<Value = PaginationConfig> {
    (1u32..=200).prop_flat_map(|max_limit| {
        (1u32..=max_limit).prop_map(move |default_limit| PaginationConfig {
            default_limit,
            max_limit,
        })
    })
}

proptest! {
    /// Property: Resolved pages are 1-indexed and never exceed the configured maximum
    #[test]
    fn resolved_pages_stay_within_bounds(
        page in proptest::option::of(any::<u32>()),
        limit in proptest::option::of(any::<u32>()),
        config in pagination_config_strategy(),
    ) {
        let request = PageRequest::resolve(page, limit, &config);

        prop_assert!(request.page >= 1);
        prop_assert!(request.limit >= 1);
        prop_assert!(request.limit <= config.max_limit);
    }

    /// Property: Consecutive pages never overlap
    #[test]
    fn consecutive_pages_are_adjacent(page in 1u32..10_000, limit in 1u32..=100) {
        let config = PaginationConfig { default_limit: 10, max_limit: 100 };
        let current = PageRequest::resolve(Some(page), Some(limit), &config);
        let next = PageRequest::resolve(Some(page + 1), Some(limit), &config);

        prop_assert_eq!(next.offset(), current.offset() + current.limit());
    }

    /// Property: Task ids survive their string form
    #[test]
    fn task_ids_parse_back_from_display(count in 1usize..200) {
        let ids: Vec<TaskId> = (0..count).map(|_| TaskId::new()).collect();
        let unique: HashSet<_> = ids.iter().collect();
        prop_assert_eq!(unique.len(), count);

        for id in ids {
            let parsed: TaskId = id.to_string().parse().unwrap();
            prop_assert_eq!(parsed, id);
        }
    }
}
