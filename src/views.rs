//! Display state derived from the in-memory collections.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::models::{ChecklistItem, Project, ShoppingCategory, ShoppingItem, ShoppingList, User};

/// `round(100 * done / total)` with halves rounded up; 0 for an empty set.
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = done.min(total);
    ((200 * done + total) / (2 * total)) as u8
}

pub fn checklist_progress(checklist: &[ChecklistItem]) -> u8 {
    let done = checklist.iter().filter(|item| item.completed).count();
    percent(done, checklist.len())
}

pub fn shopping_progress(list: &ShoppingList) -> u8 {
    let done = list.items.iter().filter(|item| item.completed).count();
    percent(done, list.items.len())
}

pub fn remaining_items(list: &ShoppingList) -> usize {
    list.items.iter().filter(|item| !item.completed).count()
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup<'a> {
    pub category: ShoppingCategory,
    pub items: Vec<&'a ShoppingItem>,
    pub completed: usize,
}

/// Buckets items by category in display order. Item order is kept inside
/// each bucket and empty buckets are left out.
pub fn group_by_category(items: &[ShoppingItem]) -> Vec<CategoryGroup<'_>> {
    ShoppingCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let bucket: Vec<&ShoppingItem> =
                items.iter().filter(|item| item.category == category).collect();
            if bucket.is_empty() {
                return None;
            }
            let completed = bucket.iter().filter(|item| item.completed).count();
            Some(CategoryGroup {
                category,
                items: bucket,
                completed,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectSort {
    /// Last updated first.
    #[default]
    Date,
    /// Highest progress first.
    Progress,
    /// Alphabetical by title.
    Title,
}

impl ProjectSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Progress => "progress",
            Self::Title => "title",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Date => Self::Progress,
            Self::Progress => Self::Title,
            Self::Title => Self::Date,
        }
    }
}

impl fmt::Display for ProjectSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectSort {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Self::Date),
            "progress" => Ok(Self::Progress),
            "title" => Ok(Self::Title),
            other => anyhow::bail!("invalid sort key: {other}"),
        }
    }
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn sort_projects(projects: &[Project], sort: ProjectSort) -> Vec<&Project> {
    let mut sorted: Vec<&Project> = projects.iter().collect();
    match sort {
        ProjectSort::Date => sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        ProjectSort::Progress => sorted.sort_by(|a, b| b.progress.cmp(&a.progress)),
        ProjectSort::Title => sorted.sort_by(|a, b| compare_titles(&a.title, &b.title)),
    }
    sorted
}

pub fn sort_shopping_lists(lists: &[ShoppingList]) -> Vec<&ShoppingList> {
    let mut sorted: Vec<&ShoppingList> = lists.iter().collect();
    sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    sorted
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectGlance {
    pub id: String,
    pub title: String,
    pub progress: u8,
    pub done: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListGlance {
    pub id: String,
    pub name: String,
    pub total: usize,
    pub remaining: usize,
}

/// Home-screen summary.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub user: Option<String>,
    pub project_count: usize,
    pub recent_projects: Vec<ProjectGlance>,
    pub shopping_list_count: usize,
    pub shopping_lists: Vec<ListGlance>,
}

/// Number of projects previewed on the home screen.
pub const RECENT_PROJECTS: usize = 3;

pub fn overview(user: Option<&User>, projects: &[Project], lists: &[ShoppingList]) -> Overview {
    Overview {
        user: user.map(|u| u.name.clone()),
        project_count: projects.len(),
        recent_projects: projects
            .iter()
            .take(RECENT_PROJECTS)
            .map(|p| ProjectGlance {
                id: p.id.clone(),
                title: p.title.clone(),
                progress: p.progress,
                done: p.completed_count(),
                total: p.checklist.len(),
            })
            .collect(),
        shopping_list_count: lists.len(),
        shopping_lists: lists
            .iter()
            .map(|l| ListGlance {
                id: l.id.clone(),
                name: l.name.clone(),
                total: l.items.len(),
                remaining: remaining_items(l),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    use crate::models::{NewShoppingItem, new_id};

    fn project(title: &str, progress: u8, minutes_ago: i64) -> Project {
        let ts = Utc::now() - Duration::minutes(minutes_ago);
        Project {
            id: new_id(),
            title: title.to_string(),
            description: String::new(),
            checklist: Vec::new(),
            progress,
            comments: Vec::new(),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn item(name: &str, category: ShoppingCategory, completed: bool) -> ShoppingItem {
        let mut item = ShoppingItem::new(
            NewShoppingItem {
                name: name.to_string(),
                quantity: None,
                category,
            },
            "Jan",
        );
        item.completed = completed;
        item
    }

    fn list(name: &str, items: Vec<ShoppingItem>, minutes_ago: i64) -> ShoppingList {
        let ts = Utc::now() - Duration::minutes(minutes_ago);
        ShoppingList {
            id: new_id(),
            name: name.to_string(),
            items,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_percent_matches_rounding() {
        for total in 0..=12usize {
            for done in 0..=total {
                let expected = if total == 0 {
                    0
                } else {
                    (100.0 * done as f64 / total as f64).round() as u8
                };
                assert_eq!(percent(done, total), expected, "{done}/{total}");
            }
        }
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
    }

    #[test]
    fn test_checklist_progress() {
        let mut items = vec![ChecklistItem::new("Buy paint")];
        assert_eq!(checklist_progress(&items), 0);
        items[0].completed = true;
        assert_eq!(checklist_progress(&items), 100);
        assert_eq!(checklist_progress(&[]), 0);
    }

    #[test]
    fn test_group_two_categories_preserves_order() {
        let items = vec![
            item("Ljus", ShoppingCategory::Other, false),
            item("Mjölk", ShoppingCategory::Dairy, false),
            item("Batterier", ShoppingCategory::Other, true),
            item("Ost", ShoppingCategory::Dairy, true),
        ];

        let groups = group_by_category(&items);
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].category, ShoppingCategory::Dairy);
        let dairy: Vec<&str> = groups[0].items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(dairy, ["Mjölk", "Ost"]);
        assert_eq!(groups[0].completed, 1);

        assert_eq!(groups[1].category, ShoppingCategory::Other);
        let other: Vec<&str> = groups[1].items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(other, ["Ljus", "Batterier"]);
    }

    #[test]
    fn test_group_empty_list() {
        assert!(group_by_category(&[]).is_empty());
    }

    #[test]
    fn test_sort_by_date_newest_first() {
        let projects = vec![project("T1", 0, 30), project("T3", 0, 10), project("T2", 0, 20)];
        let titles: Vec<&str> = sort_projects(&projects, ProjectSort::Date)
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, ["T3", "T2", "T1"]);
    }

    #[test]
    fn test_sort_by_progress_desc() {
        let projects = vec![project("a", 20, 0), project("b", 90, 0), project("c", 50, 0)];
        let progress: Vec<u8> = sort_projects(&projects, ProjectSort::Progress)
            .iter()
            .map(|p| p.progress)
            .collect();
        assert_eq!(progress, [90, 50, 20]);
    }

    #[test]
    fn test_sort_by_title_case_insensitive() {
        let projects = vec![project("garage", 0, 0), project("Altan", 0, 0), project("bil", 0, 0)];
        let titles: Vec<&str> = sort_projects(&projects, ProjectSort::Title)
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, ["Altan", "bil", "garage"]);
    }

    #[test]
    fn test_sort_key_parse_and_cycle() {
        assert_eq!("progress".parse::<ProjectSort>().unwrap(), ProjectSort::Progress);
        assert!("size".parse::<ProjectSort>().is_err());
        assert_eq!(ProjectSort::Title.next(), ProjectSort::Date);
        assert_eq!(ProjectSort::default(), ProjectSort::Date);
    }

    #[test]
    fn test_shopping_lists_sorted_by_update() {
        let lists = vec![list("old", Vec::new(), 60), list("new", Vec::new(), 1)];
        let names: Vec<&str> = sort_shopping_lists(&lists)
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, ["new", "old"]);
    }

    #[test]
    fn test_shopping_progress_and_remaining() {
        let l = list(
            "Vecka",
            vec![
                item("a", ShoppingCategory::Dairy, true),
                item("b", ShoppingCategory::Dairy, false),
                item("c", ShoppingCategory::Frozen, false),
            ],
            0,
        );
        assert_eq!(shopping_progress(&l), 33);
        assert_eq!(remaining_items(&l), 2);
    }

    #[test]
    fn test_overview_previews_three_projects() {
        let projects: Vec<Project> = (0..5).map(|i| project(&format!("p{i}"), 0, i)).collect();
        let lists = vec![list("Vecka", vec![item("a", ShoppingCategory::Dairy, false)], 0)];
        let user = User::new("Eva").unwrap();

        let o = overview(Some(&user), &projects, &lists);
        assert_eq!(o.user.as_deref(), Some("Eva"));
        assert_eq!(o.project_count, 5);
        assert_eq!(o.recent_projects.len(), RECENT_PROJECTS);
        assert_eq!(o.recent_projects[0].title, "p0");
        assert_eq!(o.shopping_lists[0].remaining, 1);
    }
}
