use uuid::Uuid;

use super::Bar;

/// New sort position for one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortUpdate {
    pub project_id: Uuid,
    pub sort_order: i32,
}

/// Move `dragged` to `target_index` in the current bar order.
///
/// Returns the sort orders that change, densely renumbered from 0. An empty
/// plan means nothing moves: unknown project, or already at the target row.
pub fn plan_reorder(bars: &[Bar], dragged: Uuid, target_index: usize) -> Vec<SortUpdate> {
    let Some(from) = bars.iter().position(|b| b.project_id == dragged) else {
        return Vec::new();
    };
    let target = target_index.min(bars.len().saturating_sub(1));
    if from == target {
        return Vec::new();
    }

    let mut order: Vec<&Bar> = bars.iter().collect();
    let moved = order.remove(from);
    order.insert(target, moved);

    order
        .iter()
        .enumerate()
        .filter(|(index, bar)| bar.sort_key != *index as i32)
        .map(|(index, bar)| SortUpdate {
            project_id: bar.project_id,
            sort_order: index as i32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use crate::layout::tests::{timed, ymd};
    use crate::model::Project;

    fn apply(projects: &mut [Project], updates: &[SortUpdate]) {
        for update in updates {
            let project = projects.iter_mut().find(|p| p.id == update.project_id).unwrap();
            project.timeline.as_mut().unwrap().sort_order = Some(update.sort_order);
        }
    }

    fn names(projects: &[Project]) -> Vec<String> {
        compute_layout(projects, 1.0, ymd(2026, 1, 1))
            .bars
            .into_iter()
            .map(|b| b.name)
            .collect()
    }

    fn sample() -> Vec<Project> {
        vec![
            timed("Gin", None, ymd(2026, 1, 5), 4),
            timed("Rum", None, ymd(2026, 2, 5), 4),
            timed("Whisky", None, ymd(2026, 3, 5), 4),
            timed("Vodka", None, ymd(2026, 4, 5), 4),
        ]
    }

    #[test]
    fn moves_dragged_row_to_target() {
        let mut projects = sample();
        let layout = compute_layout(&projects, 1.0, ymd(2026, 1, 1));
        let vodka = layout.bars[3].project_id;

        let updates = plan_reorder(&layout.bars, vodka, 1);
        apply(&mut projects, &updates);
        assert_eq!(names(&projects), ["Gin", "Vodka", "Rum", "Whisky"]);
    }

    #[test]
    fn dropping_on_own_row_changes_nothing() {
        let mut projects = sample();
        let before = names(&projects);
        let layout = compute_layout(&projects, 1.0, ymd(2026, 1, 1));

        for bar in &layout.bars {
            let updates = plan_reorder(&layout.bars, bar.project_id, bar.row);
            assert!(updates.is_empty());
            apply(&mut projects, &updates);
        }
        assert_eq!(names(&projects), before);
    }

    #[test]
    fn target_past_the_end_is_clamped() {
        let mut projects = sample();
        let layout = compute_layout(&projects, 1.0, ymd(2026, 1, 1));
        let gin = layout.bars[0].project_id;

        apply(&mut projects, &plan_reorder(&layout.bars, gin, 42));
        assert_eq!(names(&projects), ["Rum", "Whisky", "Vodka", "Gin"]);
    }

    #[test]
    fn only_changed_rows_are_written() {
        let mut projects = sample();
        for (i, p) in projects.iter_mut().enumerate() {
            p.timeline.as_mut().unwrap().sort_order = Some(i as i32);
        }
        let layout = compute_layout(&projects, 1.0, ymd(2026, 1, 1));
        let updates = plan_reorder(&layout.bars, layout.bars[2].project_id, 1);
        let touched: Vec<i32> = updates.iter().map(|u| u.sort_order).collect();
        assert_eq!(touched, [1, 2]);
    }

    #[test]
    fn unknown_project_is_ignored() {
        let layout = compute_layout(&sample(), 1.0, ymd(2026, 1, 1));
        assert!(plan_reorder(&layout.bars, Uuid::new_v4(), 0).is_empty());
    }
}
