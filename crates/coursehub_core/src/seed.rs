//! Bootstrap dataset written into never-initialized collections.
//!
//! The fixture is internally consistent: every foreign key resolves, every
//! enrollment's progress matches its course, and derived course fields are
//! computed rather than hard-coded.

use crate::model::course::{
    assign_lesson_ids, Course, DifficultyLevel, LessonDraft, LessonType,
};
use crate::model::enrollment::Enrollment;
use crate::model::review::Review;
use crate::model::user::{Role, User};
use crate::model::{Record, RecordId};
use crate::repo::Collections;
use crate::service::aggregate::{self, refresh_derived_fields};
use crate::service::credentials::CredentialHasher;
use crate::service::error::DataResult;
use crate::service::progress;
use log::info;
use std::collections::{HashMap, HashSet};

/// 2024-01-15T00:00:00Z.
const BASE_DATE_MS: i64 = 1_705_276_800_000;
const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub const ADMIN_ID: RecordId = 1;
pub const INSTRUCTOR_SARAH_ID: RecordId = 2;
pub const INSTRUCTOR_MICHAEL_ID: RecordId = 3;
pub const PENDING_INSTRUCTOR_ID: RecordId = 4;
pub const STUDENT_JOHN_ID: RecordId = 5;
pub const STUDENT_EMMA_ID: RecordId = 6;
pub const WEB_COURSE_ID: RecordId = 101;
pub const DATA_COURSE_ID: RecordId = 102;
pub const PENDING_COURSE_ID: RecordId = 103;

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub users: Vec<User>,
    pub courses: Vec<Course>,
    pub enrollments: Vec<Enrollment>,
    pub reviews: Vec<Review>,
}

/// Builds the fixture, hashing every fixture password with `hasher`.
pub fn bootstrap_dataset(hasher: &CredentialHasher) -> DataResult<Dataset> {
    let users = vec![
        user(
            hasher,
            ADMIN_ID,
            "Admin User",
            "admin@coursehub.dev",
            "admin123",
            Role::Admin,
            true,
            0,
        )?,
        user(
            hasher,
            INSTRUCTOR_SARAH_ID,
            "Sarah Johnson",
            "sarah@coursehub.dev",
            "instructor123",
            Role::Instructor,
            true,
            2,
        )?,
        user(
            hasher,
            INSTRUCTOR_MICHAEL_ID,
            "Michael Chen",
            "michael@coursehub.dev",
            "instructor123",
            Role::Instructor,
            true,
            5,
        )?,
        user(
            hasher,
            PENDING_INSTRUCTOR_ID,
            "Priya Patel",
            "priya@coursehub.dev",
            "instructor123",
            Role::Instructor,
            false,
            40,
        )?,
        user(
            hasher,
            STUDENT_JOHN_ID,
            "John Smith",
            "john@coursehub.dev",
            "student123",
            Role::Student,
            true,
            10,
        )?,
        user(
            hasher,
            STUDENT_EMMA_ID,
            "Emma Wilson",
            "emma@coursehub.dev",
            "student123",
            Role::Student,
            true,
            12,
        )?,
    ];

    let mut courses = vec![
        course(
            WEB_COURSE_ID,
            "Complete Web Development Bootcamp",
            INSTRUCTOR_SARAH_ID,
            "Web Development",
            DifficultyLevel::Beginner,
            49.99,
            true,
            vec![
                lesson(
                    "Introduction to HTML",
                    LessonType::Video,
                    "https://videos.coursehub.dev/html-intro.mp4",
                    "15 min",
                ),
                lesson(
                    "Styling with CSS",
                    LessonType::Video,
                    "https://videos.coursehub.dev/css-basics.mp4",
                    "25 min",
                ),
                lesson(
                    "JavaScript Fundamentals",
                    LessonType::Pdf,
                    "https://docs.coursehub.dev/js-fundamentals.pdf",
                    "40 min",
                ),
                lesson(
                    "Building Your First Page",
                    LessonType::Text,
                    "Put HTML, CSS and JavaScript together.",
                    "30 min",
                ),
            ],
            3,
        ),
        course(
            DATA_COURSE_ID,
            "Data Science with Python",
            INSTRUCTOR_MICHAEL_ID,
            "Data Science",
            DifficultyLevel::Intermediate,
            79.0,
            true,
            vec![
                lesson(
                    "Python Refresher",
                    LessonType::Text,
                    "Variables, functions and collections.",
                    "20 min",
                ),
                lesson(
                    "Working with pandas",
                    LessonType::Video,
                    "https://videos.coursehub.dev/pandas.mp4",
                    "35 min",
                ),
                lesson(
                    "Visualizing Data",
                    LessonType::Pdf,
                    "https://docs.coursehub.dev/plotting.pdf",
                    "30 min",
                ),
            ],
            6,
        ),
        course(
            PENDING_COURSE_ID,
            "Mobile App Design Fundamentals",
            INSTRUCTOR_SARAH_ID,
            "Design",
            DifficultyLevel::Beginner,
            0.0,
            false,
            vec![
                lesson(
                    "Design Principles",
                    LessonType::Video,
                    "https://videos.coursehub.dev/design.mp4",
                    "18 min",
                ),
                lesson("Prototyping", LessonType::Text, "Sketch, wireframe, iterate.", "22 min"),
            ],
            45,
        ),
    ];

    let web_total = courses[0].lesson_count();
    let data_total = courses[1].lesson_count();
    let mut enrollments = vec![
        enrollment(201, STUDENT_JOHN_ID, WEB_COURSE_ID, &[1, 2], web_total, 14),
        enrollment(202, STUDENT_EMMA_ID, WEB_COURSE_ID, &[1, 2, 3, 4], web_total, 15),
        enrollment(203, STUDENT_JOHN_ID, DATA_COURSE_ID, &[], data_total, 20),
    ];

    let reviews = vec![
        review(
            301,
            WEB_COURSE_ID,
            STUDENT_EMMA_ID,
            5,
            "Clear explanations from start to finish.",
            30,
        ),
        review(
            302,
            WEB_COURSE_ID,
            STUDENT_JOHN_ID,
            4,
            "Great pace, wish it had more exercises.",
            31,
        ),
    ];
    for review in &reviews {
        if let Some(enrollment) = enrollments
            .iter_mut()
            .find(|enrollment| enrollment.is_for(review.student_id, review.course_id))
        {
            enrollment.rating = Some(review.rating);
            enrollment.review = Some(review.review.clone());
        }
    }

    refresh_derived_fields(&mut courses, &enrollments, &reviews);

    Ok(Dataset {
        users,
        courses,
        enrollments,
        reviews,
    })
}

/// Seeds every collection key that has never been written.
///
/// Returns the keys that were seeded. Existing collections are untouched,
/// apart from their courses' derived fields. When only some keys are missing,
/// seeded rows whose references do not resolve against the live collections
/// are dropped before writing.
pub fn seed_missing(
    collections: &Collections<'_>,
    hasher: &CredentialHasher,
) -> DataResult<Vec<&'static str>> {
    let users_missing = !collections.users.exists()?;
    let courses_missing = !collections.courses.exists()?;
    let enrollments_missing = !collections.enrollments.exists()?;
    let reviews_missing = !collections.reviews.exists()?;

    let mut seeded = Vec::new();
    if !(users_missing || courses_missing || enrollments_missing || reviews_missing) {
        return Ok(seeded);
    }

    let Dataset {
        users,
        mut courses,
        mut enrollments,
        mut reviews,
    } = bootstrap_dataset(hasher)?;

    let users = if users_missing {
        collections.users.replace_all(&users)?;
        seeded.push(User::COLLECTION);
        users
    } else {
        collections.users.list()?
    };
    let roles: HashMap<RecordId, Role> = users.iter().map(|user| (user.id, user.role)).collect();
    let has_role = |id: RecordId, role: Role| roles.get(&id) == Some(&role);

    let course_ids: HashSet<RecordId> = if courses_missing {
        courses.retain(|course| has_role(course.instructor_id, Role::Instructor));
        collections.courses.replace_all(&courses)?;
        seeded.push(Course::COLLECTION);
        courses.iter().map(|course| course.id).collect()
    } else {
        collections.courses.list()?.iter().map(|course| course.id).collect()
    };

    let enrolled: HashSet<(RecordId, RecordId)> = if enrollments_missing {
        enrollments.retain(|enrollment| {
            has_role(enrollment.student_id, Role::Student)
                && course_ids.contains(&enrollment.course_id)
        });
        collections.enrollments.replace_all(&enrollments)?;
        seeded.push(Enrollment::COLLECTION);
        enrollments.iter().map(|e| (e.student_id, e.course_id)).collect()
    } else {
        collections
            .enrollments
            .list()?
            .iter()
            .map(|e| (e.student_id, e.course_id))
            .collect()
    };

    if reviews_missing {
        reviews.retain(|review| enrolled.contains(&(review.student_id, review.course_id)));
        collections.reviews.replace_all(&reviews)?;
        seeded.push(Review::COLLECTION);
    }

    aggregate::recompute_all(collections)?;
    info!(
        "event=seed module=seed status=ok collections={}",
        seeded.join(",")
    );
    Ok(seeded)
}

/// Overwrites all four collections with `dataset`.
pub fn write_dataset(collections: &Collections<'_>, dataset: &Dataset) -> DataResult<()> {
    collections.users.replace_all(&dataset.users)?;
    collections.courses.replace_all(&dataset.courses)?;
    collections.enrollments.replace_all(&dataset.enrollments)?;
    collections.reviews.replace_all(&dataset.reviews)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn user(
    hasher: &CredentialHasher,
    id: RecordId,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
    approved: bool,
    joined_day: i64,
) -> DataResult<User> {
    Ok(User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        password_hash: hasher.hash(password)?,
        role,
        approved,
        avatar: None,
        joined_date: BASE_DATE_MS + joined_day * DAY_MS,
    })
}

#[allow(clippy::too_many_arguments)]
fn course(
    id: RecordId,
    title: &str,
    instructor_id: RecordId,
    category: &str,
    difficulty_level: DifficultyLevel,
    price: f64,
    approved: bool,
    lessons: Vec<LessonDraft>,
    created_day: i64,
) -> Course {
    let lessons = assign_lesson_ids(lessons);
    Course {
        id,
        title: title.to_string(),
        description: format!("{title}: a hands-on {category} course."),
        instructor_id,
        category: category.to_string(),
        difficulty_level,
        duration: format!("{} weeks", lessons.len() * 2),
        price,
        syllabus: lessons.iter().map(|lesson| lesson.title.clone()).collect(),
        lessons,
        thumbnail: None,
        approved,
        created_date: BASE_DATE_MS + created_day * DAY_MS,
        total_enrollments: 0,
        average_rating: 0.0,
    }
}

fn lesson(title: &str, kind: LessonType, content: &str, duration: &str) -> LessonDraft {
    let mut draft = LessonDraft::new(title, kind, content);
    draft.duration = duration.to_string();
    draft
}

fn enrollment(
    id: RecordId,
    student_id: RecordId,
    course_id: RecordId,
    completed: &[u32],
    total: usize,
    enrolled_day: i64,
) -> Enrollment {
    let enrolled = BASE_DATE_MS + enrolled_day * DAY_MS;
    let mut enrollment = Enrollment::started(id, student_id, course_id, enrolled);
    for (offset, lesson_id) in completed.iter().enumerate() {
        let at = enrolled + (offset as i64 + 1) * DAY_MS;
        progress::mark_complete(&mut enrollment, *lesson_id, total, at);
    }
    enrollment
}

fn review(
    id: RecordId,
    course_id: RecordId,
    student_id: RecordId,
    rating: u8,
    text: &str,
    day: i64,
) -> Review {
    Review {
        id,
        course_id,
        student_id,
        rating,
        review: text.to_string(),
        date: BASE_DATE_MS + day * DAY_MS,
    }
}
