use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::datetime::{DateRange, iso_date_serde};

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum Category {
    #[default]
    #[serde(rename = "todo")]
    Todo = 0,
    #[serde(rename = "inprogress", alias = "in-progress")]
    InProgress = 1,
    #[serde(rename = "review")]
    Review = 2,
    #[serde(rename = "completed")]
    Completed = 3,
}

#[derive(Debug)]
pub struct CategoryStyle {
    pub key: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

// Indexed by the enum discriminant.
const CATEGORY_STYLES: [CategoryStyle; 4] = [
    CategoryStyle {
        key: "todo",
        label: "To Do",
        color: "#93c5fd",
    },
    CategoryStyle {
        key: "inprogress",
        label: "In Progress",
        color: "#facc15",
    },
    CategoryStyle {
        key: "review",
        label: "Review",
        color: "#f472b6",
    },
    CategoryStyle {
        key: "completed",
        label: "Completed",
        color: "#34d399",
    },
];

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Todo,
        Category::InProgress,
        Category::Review,
        Category::Completed,
    ];

    pub fn style(self) -> &'static CategoryStyle {
        &CATEGORY_STYLES[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.style().key
    }

    pub fn label(self) -> &'static str {
        self.style().label
    }

    pub fn color(self) -> &'static str {
        self.style().color
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "in-progress" {
            return Ok(Category::InProgress);
        }
        Category::ALL
            .into_iter()
            .find(|category| category.key() == wanted)
            .ok_or_else(|| anyhow!("unknown category: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,

    pub name: String,

    #[serde(default)]
    pub category: Category,

    #[serde(with = "iso_date_serde")]
    pub start: NaiveDate,

    #[serde(with = "iso_date_serde")]
    pub end: NaiveDate,

    #[serde(default, rename = "videoUrl", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// Everything a task carries except its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub name: String,
    pub category: Category,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub video_url: Option<Option<String>>,
}

impl TaskPatch {
    pub fn range(range: DateRange) -> Self {
        Self {
            start: Some(range.start),
            end: Some(range.end),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl Task {
    pub fn from_draft(id: TaskId, draft: TaskDraft) -> Self {
        Self {
            id,
            name: draft.name,
            category: draft.category,
            start: draft.start,
            end: draft.end,
            video_url: draft.video_url,
        }
    }

    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(start) = patch.start {
            self.start = start;
        }
        if let Some(end) = patch.end {
            self.end = end;
        }
        if let Some(video_url) = patch.video_url {
            self.video_url = video_url;
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }

    /// Inclusive on both ends; a task whose start is after its end covers nothing.
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn overlaps(&self, window: &DateRange) -> bool {
        self.range().overlaps(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn category_table_matches_keys() {
        for category in Category::ALL {
            let parsed: Category = category.key().parse().expect("parse key");
            assert_eq!(parsed, category);
            assert!(category.color().starts_with('#'));
        }
        assert_eq!(
            "In-Progress".parse::<Category>().expect("alias"),
            Category::InProgress
        );
        assert!("blocked".parse::<Category>().is_err());
    }

    #[test]
    fn task_serializes_with_wire_names() {
        let task = Task {
            id: TaskId::from("t1"),
            name: "Film intro".to_string(),
            category: Category::InProgress,
            start: date(2024, 1, 10),
            end: date(2024, 1, 12),
            video_url: Some("https://youtu.be/abc123".to_string()),
        };

        let value = serde_json::to_value(&task).expect("serialize");
        assert_eq!(value["id"], "t1");
        assert_eq!(value["category"], "inprogress");
        assert_eq!(value["start"], "2024-01-10");
        assert_eq!(value["videoUrl"], "https://youtu.be/abc123");

        let without_video = Task {
            video_url: None,
            ..task
        };
        let value = serde_json::to_value(&without_video).expect("serialize");
        assert!(value.get("videoUrl").is_none());
    }

    #[test]
    fn patch_replaces_only_given_fields() {
        let mut task = Task::from_draft(
            TaskId::from("t1"),
            TaskDraft {
                name: "Edit".to_string(),
                category: Category::Todo,
                start: date(2024, 3, 1),
                end: date(2024, 3, 2),
                video_url: Some("https://vimeo.com/1".to_string()),
            },
        );

        task.apply(TaskPatch {
            category: Some(Category::Review),
            video_url: Some(None),
            ..TaskPatch::default()
        });

        assert_eq!(task.name, "Edit");
        assert_eq!(task.category, Category::Review);
        assert_eq!(task.video_url, None);
        assert_eq!(task.range(), DateRange::new(date(2024, 3, 1), date(2024, 3, 2)));
    }

    #[test]
    fn inverted_task_covers_no_day() {
        let task = Task::from_draft(
            TaskId::generate(),
            TaskDraft {
                name: "Backwards".to_string(),
                category: Category::Todo,
                start: date(2024, 3, 5),
                end: date(2024, 3, 1),
                video_url: None,
            },
        );
        assert!(!task.covers(date(2024, 3, 3)));
        assert!(!task.covers(date(2024, 3, 5)));
    }
}
