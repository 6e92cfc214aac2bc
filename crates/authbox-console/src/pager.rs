//! Page-number window for list views.

use authbox_api_models::Page;

const STOPS: i128 = 6;

/// Produce the page numbers to offer as navigation between `min` and `max`.
///
/// Stops are spaced by `floor((max - min) / 6)` (at least 1). `current` is
/// inserted before the first stop that jumps over it, appended if the walk
/// never produced it, and `max` is appended if the walk did not land on it.
/// `current` is not validated against the range; an out-of-range value is
/// appended after the walk.
#[must_use]
pub fn pagination_range(min: i64, max: i64, current: i64) -> Vec<i64> {
    let span = i128::from(max) - i128::from(min);
    let step = i64::try_from(span.div_euclid(STOPS).max(1)).unwrap_or(i64::MAX);

    let mut stops = Vec::new();
    let mut previous: Option<i64> = None;
    let mut current_added = false;
    let mut stop = Some(min);
    while let Some(value) = stop.filter(|value| *value <= max) {
        if previous.is_some_and(|prev| prev < current && current < value) {
            stops.push(current);
            current_added = true;
        }
        if value == current {
            current_added = true;
        }
        stops.push(value);
        previous = Some(value);
        stop = value.checked_add(step);
    }

    if !current_added {
        stops.push(current);
    }
    if !stops.contains(&max) {
        stops.push(max);
    }
    stops
}

/// Window for a fetched page: stops from the first to the last page, around the current one.
#[must_use]
pub fn page_window<T>(page: &Page<T>) -> Vec<i64> {
    pagination_range(
        0,
        i64::from(page.last_page_index()),
        i64::from(page.current_page),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_non_decreasing(stops: &[i64]) -> bool {
        stops.windows(2).all(|pair| pair[0] <= pair[1])
    }

    #[test]
    fn window_spaces_stops_and_keeps_current() {
        assert_eq!(
            pagination_range(0, 20, 9),
            vec![0, 3, 6, 9, 12, 15, 18, 20]
        );
        assert_eq!(
            pagination_range(0, 20, 10),
            vec![0, 3, 6, 9, 10, 12, 15, 18, 20]
        );
    }

    #[test]
    fn short_ranges_use_unit_steps() {
        assert_eq!(pagination_range(0, 4, 2), vec![0, 1, 2, 3, 4]);
        assert_eq!(pagination_range(0, 0, 0), vec![0]);
    }

    #[test]
    fn degenerate_range_still_includes_current_and_max() {
        assert_eq!(pagination_range(5, 3, 4), vec![4, 3]);
        assert_eq!(pagination_range(0, -1, 0), vec![0, -1]);
    }

    #[test]
    fn out_of_range_current_is_appended() {
        assert_eq!(pagination_range(0, 3, 7), vec![0, 1, 2, 3, 7]);
    }

    #[test]
    fn max_appended_once_when_walk_misses_it() {
        let stops = pagination_range(0, 13, 0);
        assert_eq!(stops, vec![0, 2, 4, 6, 8, 10, 12, 13]);
        assert_eq!(stops.iter().filter(|stop| **stop == 13).count(), 1);
    }

    #[test]
    fn in_range_properties_hold() {
        for max in 0..60 {
            for current in 0..=max {
                let stops = pagination_range(0, max, current);
                assert!(is_non_decreasing(&stops), "{max}/{current}: {stops:?}");
                assert_eq!(stops.last(), Some(&max), "{max}/{current}: {stops:?}");
                assert_eq!(stops.iter().filter(|stop| **stop == max).count(), 1);
                assert!(stops.contains(&current), "{max}/{current}: {stops:?}");
            }
        }
    }

    #[test]
    fn extreme_bounds_do_not_overflow() {
        let stops = pagination_range(i64::MIN, i64::MAX, 0);
        assert_eq!(stops.first(), Some(&i64::MIN));
        assert_eq!(stops.last(), Some(&i64::MAX));
        assert!(stops.contains(&0));
        assert!(is_non_decreasing(&stops));
    }

    #[test]
    fn page_window_spans_all_pages() {
        let page = Page::<()> {
            content: Vec::new(),
            total_pages: 5,
            current_page: 2,
            page_size: 10,
            total_elements: Some(45),
        };
        assert_eq!(page_window(&page), vec![0, 1, 2, 3, 4]);
        assert_eq!(page_window(&Page::<()>::empty(10)), vec![0]);
    }
}
