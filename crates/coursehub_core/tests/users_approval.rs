use coursehub_core::{
    Created, DataError, DataLayerConfig, DataService, DifficultyLevel, LessonDraft, LessonType,
    ManualClock, MemoryStore, NewCourse, NewUser, PasswordHashingConfig, RecordId, Role,
    UserPatch,
};

#[test]
fn duplicate_email_returns_existing_user() {
    let service = service();
    let first = service
        .create_user(new_user("Ada", "ada@example.com", Role::Student))
        .unwrap();
    let second = service
        .create_user(new_user("Other Ada", "ADA@Example.com ", Role::Student))
        .unwrap();

    assert!(first.is_new());
    assert!(matches!(second, Created::AlreadyExists(ref user) if user.id == first.record().id));
    assert_eq!(service.list_users().unwrap().len(), 1);
    assert_eq!(
        service.get_user_by_email("Ada@example.com").unwrap().unwrap().name,
        "Ada"
    );
}

#[test]
fn passwords_are_stored_hashed_and_verified() {
    let service = service();
    let user = service
        .create_user(new_user("Ada", "ada@example.com", Role::Student))
        .unwrap()
        .into_record();

    assert_ne!(user.password_hash, "secret-pass");
    assert!(user.password_hash.starts_with("$argon2id$"));
    assert_eq!(
        service
            .authenticate("ada@example.com", "secret-pass")
            .unwrap()
            .map(|u| u.id),
        Some(user.id)
    );
    assert_eq!(service.authenticate("ada@example.com", "wrong").unwrap(), None);
    assert_eq!(service.authenticate("nobody@example.com", "secret-pass").unwrap(), None);
}

#[test]
fn invalid_registration_is_rejected() {
    let service = service();
    let bad_email = service
        .create_user(new_user("Ada", "not-an-email", Role::Student))
        .unwrap_err();
    assert!(matches!(bad_email, DataError::Validation(_)));

    let blank_name = service
        .create_user(new_user("  ", "ada@example.com", Role::Student))
        .unwrap_err();
    assert!(matches!(blank_name, DataError::Validation(_)));

    let mut no_password = new_user("Ada", "ada@example.com", Role::Student);
    no_password.password.clear();
    assert!(matches!(
        service.create_user(no_password).unwrap_err(),
        DataError::Credential(_)
    ));
    assert!(service.list_users().unwrap().is_empty());
}

#[test]
fn profile_updates_guard_email_uniqueness() {
    let service = service();
    let ada = id(service.create_user(new_user("Ada", "ada@example.com", Role::Student)));
    id(service.create_user(new_user("Ben", "ben@example.com", Role::Student)));

    let conflict = service
        .update_user(
            ada,
            UserPatch {
                email: Some("BEN@example.com".to_string()),
                ..UserPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(conflict, DataError::Conflict(_)));

    let renamed = service
        .update_user(
            ada,
            UserPatch {
                name: Some("Ada L.".to_string()),
                password: Some("new-secret".to_string()),
                ..UserPatch::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "Ada L.");
    assert!(service.authenticate("ada@example.com", "new-secret").unwrap().is_some());
    assert_eq!(service.update_user(404, UserPatch::default()).unwrap(), None);
}

#[test]
fn instructors_start_pending_until_approved() {
    let service = service();
    let instructor = id(service.create_user(new_user("Ada", "ada@example.com", Role::Instructor)));
    let student = id(service.create_user(new_user("Ben", "ben@example.com", Role::Student)));

    let pending: Vec<RecordId> = service
        .list_pending_instructors()
        .unwrap()
        .into_iter()
        .map(|user| user.id)
        .collect();
    assert_eq!(pending, vec![instructor]);
    assert!(service.get_user_by_id(student).unwrap().unwrap().approved);

    let approved = service.approve_instructor(instructor).unwrap().unwrap();
    assert!(approved.approved);
    assert!(service.list_pending_instructors().unwrap().is_empty());

    assert!(matches!(
        service.approve_instructor(student).unwrap_err(),
        DataError::PreconditionFailed(_)
    ));
    assert_eq!(service.approve_instructor(404).unwrap(), None);
}

#[test]
fn rejecting_an_instructor_removes_their_courses() {
    let service = service();
    let instructor = id(service.create_user(new_user("Ada", "ada@example.com", Role::Instructor)));
    let course = service.create_course(new_course(instructor)).unwrap();

    assert!(service.reject_instructor(instructor).unwrap());
    assert_eq!(service.get_user_by_id(instructor).unwrap(), None);
    assert_eq!(service.get_course_by_id(course.id).unwrap(), None);
    assert!(!service.reject_instructor(instructor).unwrap());
}

#[test]
fn approved_records_cannot_be_rejected() {
    let service = service();
    let instructor = id(service.create_user(new_user("Ada", "ada@example.com", Role::Instructor)));
    service.approve_instructor(instructor).unwrap();
    let course = service.create_course(new_course(instructor)).unwrap();
    service.approve_course(course.id).unwrap();

    assert!(matches!(
        service.reject_instructor(instructor).unwrap_err(),
        DataError::PreconditionFailed(_)
    ));
    assert!(matches!(
        service.reject_course(course.id).unwrap_err(),
        DataError::PreconditionFailed(_)
    ));
    assert!(service.get_course_by_id(course.id).unwrap().is_some());
}

#[test]
fn rejecting_a_pending_course_deletes_it() {
    let service = service();
    let instructor = id(service.create_user(new_user("Ada", "ada@example.com", Role::Instructor)));
    let course = service.create_course(new_course(instructor)).unwrap();

    assert!(service.reject_course(course.id).unwrap());
    assert!(service.list_courses().unwrap().is_empty());
    assert!(!service.reject_course(course.id).unwrap());
}

#[test]
fn pending_course_detail_is_limited_to_owner_and_admins() {
    let service = service();
    let owner = id(service.create_user(new_user("Ada", "ada@example.com", Role::Instructor)));
    let other = id(service.create_user(new_user("Eve", "eve@example.com", Role::Instructor)));
    let admin = id(service.create_user(new_user("Root", "root@example.com", Role::Admin)));
    let student = id(service.create_user(new_user("Ben", "ben@example.com", Role::Student)));
    let course = service.create_course(new_course(owner)).unwrap();

    assert!(service.view_course(course.id, Some(owner)).unwrap().is_some());
    assert!(service.view_course(course.id, Some(admin)).unwrap().is_some());
    for viewer in [Some(student), Some(other), None] {
        assert!(matches!(
            service.view_course(course.id, viewer).unwrap_err(),
            DataError::PreconditionFailed(_)
        ));
    }

    service.approve_instructor(owner).unwrap();
    service.approve_course(course.id).unwrap();
    assert!(service.view_course(course.id, None).unwrap().is_some());
    assert_eq!(service.view_course(404, None).unwrap(), None);
}

#[test]
fn courses_of_pending_instructors_cannot_be_published() {
    let service = service();
    let instructor = id(service.create_user(new_user("Ada", "ada@example.com", Role::Instructor)));
    let course = service.create_course(new_course(instructor)).unwrap();

    assert!(matches!(
        service.approve_course(course.id).unwrap_err(),
        DataError::PreconditionFailed(_)
    ));
    assert!(!service.get_course_by_id(course.id).unwrap().unwrap().approved);
    assert!(service.list_approved_courses().unwrap().is_empty());

    service.approve_instructor(instructor).unwrap();
    let approved = service.approve_course(course.id).unwrap().unwrap();
    assert!(approved.approved);
}

#[test]
fn only_students_can_enroll() {
    let service = service();
    let instructor = id(service.create_user(new_user("Ada", "ada@example.com", Role::Instructor)));
    service.approve_instructor(instructor).unwrap();
    let course = service.create_course(new_course(instructor)).unwrap();
    service.approve_course(course.id).unwrap();

    assert!(matches!(
        service.create_enrollment(instructor, course.id).unwrap_err(),
        DataError::PreconditionFailed(_)
    ));
    assert!(matches!(
        service.create_enrollment(404, course.id).unwrap_err(),
        DataError::PreconditionFailed(_)
    ));
}

fn service() -> DataService<MemoryStore> {
    let config = DataLayerConfig {
        seed_on_first_open: false,
        password_hashing: PasswordHashingConfig::low_cost(),
        ..DataLayerConfig::default()
    };
    DataService::open_with_clock(MemoryStore::new("test"), ManualClock::new(1_000), &config)
        .unwrap()
}

fn new_user(name: &str, email: &str, role: Role) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password: "secret-pass".to_string(),
        role,
        avatar: None,
    }
}

fn id(created: Result<Created<coursehub_core::User>, DataError>) -> RecordId {
    created.unwrap().into_record().id
}

fn new_course(instructor_id: RecordId) -> NewCourse {
    NewCourse {
        title: "Practical Rust".to_string(),
        description: String::new(),
        instructor_id,
        category: "Programming".to_string(),
        difficulty_level: DifficultyLevel::Beginner,
        duration: "2 weeks".to_string(),
        price: 0.0,
        syllabus: Vec::new(),
        lessons: vec![LessonDraft::new("Intro", LessonType::Video, "https://v/1.mp4")],
        thumbnail: None,
    }
}
