//! Completion percentages, XP and roadmap filtering.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::roadmap::{Category, RoadmapItem, Role, Status};

/// `round(100 * completed / total)` over the items aligned with `role`
/// (or every item when no role is given). 0 for an empty selection.
pub fn completion_percentage(items: &[RoadmapItem], role: Option<Role>) -> u32 {
    let (completed, total) = items
        .iter()
        .filter(|item| role.map_or(true, |r| item.aligns_with(r)))
        .fold((0usize, 0usize), |(done, total), item| {
            (done + usize::from(item.is_completed()), total + 1)
        });
    percentage(completed, total)
}

fn percentage(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * completed as f64 / total as f64).round() as u32
}

/// Sum of completion rewards over completed items.
pub fn total_xp<'a>(items: impl IntoIterator<Item = &'a RoadmapItem>) -> u32 {
    items
        .into_iter()
        .filter(|item| item.is_completed())
        .map(|item| item.priority.completion_reward())
        .sum()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearProgress {
    pub year: u8,
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: Category,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub role: Option<Role>,
    pub percentage: u32,
    pub completed: usize,
    pub in_progress: usize,
    pub total: usize,
    pub xp: u32,
    pub by_year: Vec<YearProgress>,
    pub by_category: Vec<CategoryCount>,
}

pub fn build_report(items: &[RoadmapItem], role: Option<Role>) -> ProgressReport {
    let selected: Vec<&RoadmapItem> = items
        .iter()
        .filter(|item| role.map_or(true, |r| item.aligns_with(r)))
        .collect();

    let completed = selected.iter().filter(|i| i.is_completed()).count();
    let in_progress = selected
        .iter()
        .filter(|i| i.status == Status::InProgress)
        .count();

    let mut years: BTreeMap<u8, (usize, usize)> = BTreeMap::new();
    for item in &selected {
        let entry = years.entry(item.year).or_default();
        entry.0 += usize::from(item.is_completed());
        entry.1 += 1;
    }
    let by_year = years
        .into_iter()
        .map(|(year, (completed, total))| YearProgress {
            year,
            completed,
            total,
            percentage: percentage(completed, total),
        })
        .collect();

    let by_category = Category::ALL
        .iter()
        .filter_map(|category| {
            let in_category: Vec<_> = selected.iter().filter(|i| i.category == *category).collect();
            if in_category.is_empty() {
                return None;
            }
            Some(CategoryCount {
                category: *category,
                completed: in_category.iter().filter(|i| i.is_completed()).count(),
                total: in_category.len(),
            })
        })
        .collect();

    ProgressReport {
        role,
        percentage: completion_percentage(items, role),
        completed,
        in_progress,
        total: selected.len(),
        xp: total_xp(selected.iter().copied()),
        by_year,
        by_category,
    }
}

/// Query-string filter for roadmap listings. Absent fields match anything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoadmapFilter {
    pub role: Option<Role>,
    pub year: Option<u8>,
    pub category: Option<Category>,
    pub status: Option<Status>,
}

impl RoadmapFilter {
    pub fn matches(&self, item: &RoadmapItem) -> bool {
        self.role.map_or(true, |r| item.aligns_with(r))
            && self.year.map_or(true, |y| item.year == y)
            && self.category.map_or(true, |c| item.category == c)
            && self.status.map_or(true, |s| item.status == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::roadmap::roadmap_catalog;
    use crate::models::roadmap::Priority;

    fn item(id: &str, roles: Vec<Role>, status: Status) -> RoadmapItem {
        RoadmapItem {
            id: id.into(),
            year: 1,
            name: id.into(),
            description: String::new(),
            category: Category::Foundations,
            priority: Priority::Medium,
            status,
            role_alignment: roles,
            resource_name: None,
            resource_link: None,
            is_project: false,
            is_output: false,
            time_estimate: None,
        }
    }

    #[test]
    fn test_percentage_counts_role_and_all_roles() {
        let items = vec![
            item("a", vec![Role::Sde], Status::Completed),
            item("b", vec![Role::AllRoles], Status::ToDo),
            item("c", vec![Role::DataScientist], Status::Completed),
        ];
        // SDE sees a + b: 1 of 2.
        assert_eq!(completion_percentage(&items, Some(Role::Sde)), 50);
        // Data Scientist sees b + c: 1 of 2.
        assert_eq!(completion_percentage(&items, Some(Role::DataScientist)), 50);
        // Unfiltered: 2 of 3 rounds to 67.
        assert_eq!(completion_percentage(&items, None), 67);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        let mut items: Vec<RoadmapItem> = (0..8)
            .map(|i| item(&i.to_string(), vec![Role::Sde], Status::ToDo))
            .collect();
        items[0].status = Status::Completed;
        // 12.5 -> 13
        assert_eq!(completion_percentage(&items, None), 13);
    }

    #[test]
    fn test_percentage_empty_selection_is_zero() {
        let items = vec![item("a", vec![Role::Sde], Status::Completed)];
        assert_eq!(completion_percentage(&items, Some(Role::MlEngineer)), 0);
        assert_eq!(completion_percentage(&[], None), 0);
    }

    #[test]
    fn test_report_on_fresh_catalog() {
        let catalog = roadmap_catalog();
        let report = build_report(&catalog, None);
        assert_eq!(report.total, catalog.len());
        assert_eq!(report.percentage, 0);
        assert_eq!(report.xp, 0);
        assert_eq!(report.by_year.len(), 5);
        assert_eq!(
            report.by_category.iter().map(|c| c.total).sum::<usize>(),
            catalog.len()
        );
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let items = vec![item("a", vec![Role::Sde], Status::InProgress)];
        let json = serde_json::to_value(build_report(&items, None)).unwrap();
        assert_eq!(json["inProgress"], 1);
        assert!(json["byYear"].is_array());
        assert!(json["byCategory"].is_array());
        assert!(json.get("in_progress").is_none());
    }

    #[test]
    fn test_xp_sums_rewards_of_completed_items() {
        let mut items = vec![
            item("a", vec![Role::Sde], Status::Completed),
            item("b", vec![Role::Sde], Status::Completed),
            item("c", vec![Role::Sde], Status::ToDo),
        ];
        items[1].priority = Priority::High;
        assert_eq!(total_xp(&items), 20 + 30);
    }

    #[test]
    fn test_filter_combines_fields() {
        let catalog = roadmap_catalog();
        let filter = RoadmapFilter {
            year: Some(2),
            role: Some(Role::Sde),
            ..Default::default()
        };
        let hits: Vec<_> = catalog.iter().filter(|i| filter.matches(i)).collect();
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|i| i.year == 2 && i.aligns_with(Role::Sde)));
    }
}
