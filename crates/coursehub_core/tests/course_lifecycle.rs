use coursehub_core::{
    Clock, Course, DataError, DataLayerConfig, DataService, DifficultyLevel, LessonDraft,
    LessonType, ManualClock, MemoryStore, NewCourse, NewUser, PasswordHashingConfig, RecordId,
    Role,
};

const START_MS: i64 = 1_700_000_000_000;

#[test]
fn course_lifecycle_keeps_enrollments_and_ratings_consistent() {
    let (service, clock) = service();
    let instructor = user(&service, "Ada", "ada@example.com", Role::Instructor);
    let first = user(&service, "Ben", "ben@example.com", Role::Student);
    let second = user(&service, "Cleo", "cleo@example.com", Role::Student);

    // 1. unapproved courses refuse enrollment
    let course = service.create_course(new_course(instructor, 4)).unwrap();
    assert!(!course.approved);
    assert_eq!(course.lesson_count(), 4);
    let err = service.create_enrollment(first, course.id).unwrap_err();
    assert!(matches!(err, DataError::PreconditionFailed(_)));
    assert!(service.list_enrollments_by_course(course.id).unwrap().is_empty());

    // 2. approval opens enrollment
    service.approve_instructor(instructor).unwrap().unwrap();
    service.approve_course(course.id).unwrap().unwrap();
    let enrollment = service
        .create_enrollment(first, course.id)
        .unwrap()
        .into_record();
    assert_eq!(enrollment.progress, 0);
    assert!(!enrollment.completed);
    assert_eq!(total_enrollments(&service, course.id), 1);

    // 3. completing lessons
    for lesson in 1..=3 {
        clock.advance(1_000);
        service
            .mark_lesson_complete(first, course.id, lesson)
            .unwrap()
            .unwrap();
    }
    let partial = service.get_enrollment(first, course.id).unwrap().unwrap();
    assert_eq!(partial.progress, 75);
    assert!(!partial.completed);

    clock.advance(1_000);
    let done = service
        .mark_lesson_complete(first, course.id, 4)
        .unwrap()
        .unwrap();
    assert_eq!(done.progress, 100);
    assert!(done.completed);
    assert_eq!(done.completed_date, Some(clock.now_ms()));

    // 4. un-marking revokes completion
    let reverted = service
        .mark_lesson_incomplete(first, course.id, 2)
        .unwrap()
        .unwrap();
    assert_eq!(reverted.progress, 75);
    assert!(!reverted.completed);
    assert_eq!(reverted.completed_date, None);

    // 5. ratings average across students
    service.submit_review(first, course.id, 5, "Superb").unwrap();
    assert_eq!(average_rating(&service, course.id), 5.0);
    service.create_enrollment(second, course.id).unwrap();
    service.submit_review(second, course.id, 3, "Decent").unwrap();
    assert_eq!(average_rating(&service, course.id), 4.0);
    assert_eq!(total_enrollments(&service, course.id), 2);

    // 6. deletion cascades
    assert!(service.delete_course(course.id).unwrap());
    assert!(service.list_enrollments_by_course(course.id).unwrap().is_empty());
    assert!(service.list_course_reviews(course.id).unwrap().is_empty());
    assert_eq!(service.get_course_by_id(course.id).unwrap(), None);
    assert!(!service.delete_course(course.id).unwrap());
}

#[test]
fn course_creation_requires_an_instructor_owner() {
    let (service, _clock) = service();
    let student = user(&service, "Ben", "ben@example.com", Role::Student);

    let missing = service.create_course(new_course(999, 1)).unwrap_err();
    assert!(matches!(missing, DataError::PreconditionFailed(_)));

    let not_instructor = service.create_course(new_course(student, 1)).unwrap_err();
    assert!(matches!(not_instructor, DataError::PreconditionFailed(_)));
    assert!(service.list_courses().unwrap().is_empty());
}

#[test]
fn invalid_course_fields_are_rejected_before_write() {
    let (service, _clock) = service();
    let instructor = user(&service, "Ada", "ada@example.com", Role::Instructor);

    let mut negative = new_course(instructor, 1);
    negative.price = -1.0;
    assert!(matches!(
        service.create_course(negative).unwrap_err(),
        DataError::Validation(_)
    ));

    let mut untitled = new_course(instructor, 1);
    untitled.title = "   ".to_string();
    assert!(matches!(
        service.create_course(untitled).unwrap_err(),
        DataError::Validation(_)
    ));
    assert!(service.list_courses().unwrap().is_empty());
}

#[test]
fn catalog_lists_only_approved_courses() {
    let (service, _clock) = service();
    let instructor = user(&service, "Ada", "ada@example.com", Role::Instructor);
    let listed = service.create_course(new_course(instructor, 2)).unwrap();
    let pending = service.create_course(new_course(instructor, 2)).unwrap();
    service.approve_instructor(instructor).unwrap();
    service.approve_course(listed.id).unwrap();

    let approved: Vec<RecordId> = ids(service.list_approved_courses().unwrap());
    let queue: Vec<RecordId> = ids(service.list_pending_courses().unwrap());
    assert_eq!(approved, vec![listed.id]);
    assert_eq!(queue, vec![pending.id]);
    assert_eq!(service.list_courses_by_instructor(instructor).unwrap().len(), 2);
}

#[test]
fn editing_an_approved_course_keeps_it_approved() {
    let (service, _clock) = service();
    let instructor = user(&service, "Ada", "ada@example.com", Role::Instructor);
    service.approve_instructor(instructor).unwrap();
    let course = service.create_course(new_course(instructor, 2)).unwrap();
    service.approve_course(course.id).unwrap();

    let patch = coursehub_core::CoursePatch {
        title: Some("Rust in Depth".to_string()),
        price: Some(19.0),
        ..Default::default()
    };
    let edited = service.update_course(course.id, patch).unwrap().unwrap();
    assert_eq!(edited.title, "Rust in Depth");
    assert!(edited.approved);
    assert_eq!(edited.instructor_id, instructor);

    let missing = service
        .update_course(course.id + 1_000, Default::default())
        .unwrap();
    assert_eq!(missing, None);
}

#[test]
fn ids_stay_unique_when_the_clock_stalls() {
    let (service, _clock) = service();
    let instructor = user(&service, "Ada", "ada@example.com", Role::Instructor);
    let first = service.create_course(new_course(instructor, 1)).unwrap();
    let second = service.create_course(new_course(instructor, 1)).unwrap();

    assert_eq!(first.id, START_MS);
    assert_eq!(second.id, START_MS + 1);
}

fn service() -> (DataService<MemoryStore>, ManualClock) {
    let clock = ManualClock::new(START_MS);
    let config = DataLayerConfig {
        seed_on_first_open: false,
        password_hashing: PasswordHashingConfig::low_cost(),
        ..DataLayerConfig::default()
    };
    let service =
        DataService::open_with_clock(MemoryStore::new("test"), clock.clone(), &config).unwrap();
    (service, clock)
}

fn user(service: &DataService<MemoryStore>, name: &str, email: &str, role: Role) -> RecordId {
    service
        .create_user(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: "secret-pass".to_string(),
            role,
            avatar: None,
        })
        .unwrap()
        .into_record()
        .id
}

fn new_course(instructor_id: RecordId, lessons: usize) -> NewCourse {
    NewCourse {
        title: "Practical Rust".to_string(),
        description: "Ownership, traits and tooling.".to_string(),
        instructor_id,
        category: "Programming".to_string(),
        difficulty_level: DifficultyLevel::Intermediate,
        duration: "6 weeks".to_string(),
        price: 29.0,
        syllabus: vec!["Basics".to_string()],
        lessons: (1..=lessons)
            .map(|n| LessonDraft::new(format!("Lesson {n}"), LessonType::Text, "body"))
            .collect(),
        thumbnail: None,
    }
}

fn total_enrollments(service: &DataService<MemoryStore>, course_id: RecordId) -> u32 {
    service
        .get_course_by_id(course_id)
        .unwrap()
        .unwrap()
        .total_enrollments
}

fn average_rating(service: &DataService<MemoryStore>, course_id: RecordId) -> f64 {
    service
        .get_course_by_id(course_id)
        .unwrap()
        .unwrap()
        .average_rating
}

fn ids(courses: Vec<Course>) -> Vec<RecordId> {
    courses.into_iter().map(|course| course.id).collect()
}
