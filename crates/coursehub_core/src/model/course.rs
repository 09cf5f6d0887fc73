//! Course record with its embedded lessons.
//!
//! # Invariants
//! - `total_enrollments` and `average_rating` are derived fields; only the
//!   aggregation engine writes them.
//! - Lesson ids are unique within one course.
//! - `price` is finite and non-negative.

use super::{require_text, Record, RecordId, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonType {
    Video,
    Pdf,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: u32,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: LessonType,
    /// Video URL, document link or inline text depending on `kind`.
    pub content: String,
    pub duration: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub instructor_id: RecordId,
    pub category: String,
    pub difficulty_level: DifficultyLevel,
    pub duration: String,
    pub price: f64,
    #[serde(default)]
    pub syllabus: Vec<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub approved: bool,
    pub created_date: i64,
    #[serde(default)]
    pub total_enrollments: u32,
    #[serde(default)]
    pub average_rating: f64,
}

impl Record for Course {
    const COLLECTION: &'static str = "courses";

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Course {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ValidationError::NegativePrice(self.price));
        }
        let mut seen = BTreeSet::new();
        for lesson in &self.lessons {
            require_text("lesson title", &lesson.title)?;
            if !seen.insert(lesson.id) {
                return Err(ValidationError::DuplicateLessonId(lesson.id));
            }
        }
        Ok(())
    }

    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    pub fn has_lesson(&self, lesson_id: u32) -> bool {
        self.lessons.iter().any(|lesson| lesson.id == lesson_id)
    }

    pub fn lesson_ids(&self) -> BTreeSet<u32> {
        self.lessons.iter().map(|lesson| lesson.id).collect()
    }
}

/// Lesson input; `id` is assigned when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDraft {
    pub id: Option<u32>,
    pub title: String,
    pub kind: LessonType,
    pub content: String,
    pub duration: String,
    pub description: String,
}

impl LessonDraft {
    pub fn new(title: impl Into<String>, kind: LessonType, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            kind,
            content: content.into(),
            duration: String::new(),
            description: String::new(),
        }
    }
}

/// Course creation input. Derived fields and approval are not settable.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub instructor_id: RecordId,
    pub category: String,
    pub difficulty_level: DifficultyLevel,
    pub duration: String,
    pub price: f64,
    pub syllabus: Vec<String>,
    pub lessons: Vec<LessonDraft>,
    pub thumbnail: Option<String>,
}

/// Course edit; `None` leaves the field unchanged. Approval is untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub difficulty_level: Option<DifficultyLevel>,
    pub duration: Option<String>,
    pub price: Option<f64>,
    pub syllabus: Option<Vec<String>>,
    pub lessons: Option<Vec<LessonDraft>>,
    pub thumbnail: Option<String>,
}

impl CoursePatch {
    pub fn apply(self, course: &mut Course) {
        if let Some(title) = self.title {
            course.title = title;
        }
        if let Some(description) = self.description {
            course.description = description;
        }
        if let Some(category) = self.category {
            course.category = category;
        }
        if let Some(level) = self.difficulty_level {
            course.difficulty_level = level;
        }
        if let Some(duration) = self.duration {
            course.duration = duration;
        }
        if let Some(price) = self.price {
            course.price = price;
        }
        if let Some(syllabus) = self.syllabus {
            course.syllabus = syllabus;
        }
        if let Some(lessons) = self.lessons {
            course.lessons = assign_lesson_ids(lessons);
        }
        if let Some(thumbnail) = self.thumbnail {
            course.thumbnail = Some(thumbnail);
        }
    }
}

/// Keeps caller-provided lesson ids and numbers the rest after the maximum.
pub fn assign_lesson_ids(drafts: Vec<LessonDraft>) -> Vec<Lesson> {
    let mut next_id = drafts.iter().filter_map(|draft| draft.id).max().unwrap_or(0) + 1;
    drafts
        .into_iter()
        .map(|draft| {
            let id = draft.id.unwrap_or_else(|| {
                let id = next_id;
                next_id += 1;
                id
            });
            Lesson {
                id,
                title: draft.title,
                kind: draft.kind,
                content: draft.content,
                duration: draft.duration,
                description: draft.description,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{assign_lesson_ids, LessonDraft, LessonType};

    #[test]
    fn missing_lesson_ids_are_numbered_after_the_largest_given_id() {
        let mut kept = LessonDraft::new("Kept", LessonType::Video, "v.mp4");
        kept.id = Some(7);
        let lessons = assign_lesson_ids(vec![
            LessonDraft::new("A", LessonType::Text, "a"),
            kept,
            LessonDraft::new("B", LessonType::Pdf, "b.pdf"),
        ]);

        let ids: Vec<u32> = lessons.iter().map(|lesson| lesson.id).collect();
        assert_eq!(ids, vec![8, 7, 9]);
    }

    #[test]
    fn fresh_lessons_start_at_one() {
        let lessons = assign_lesson_ids(vec![
            LessonDraft::new("A", LessonType::Text, "a"),
            LessonDraft::new("B", LessonType::Text, "b"),
        ]);
        assert_eq!(lessons[0].id, 1);
        assert_eq!(lessons[1].id, 2);
    }
}
