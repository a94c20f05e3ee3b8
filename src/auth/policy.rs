//! Access decisions for course operations.
//!
//! Everything here is a pure function of the principal and a course snapshot
//! the caller already fetched. Nothing touches a store.

use uuid::Uuid;

use super::extractors::Principal;
use crate::{courses::repo_types::Course, error::AppError};

pub fn can_create_course(principal: &Principal) -> bool {
    !principal.is_student()
}

/// Same rule for update and delete: the owning instructor, or an admin.
pub fn can_mutate_course(principal: &Principal, course: &Course) -> bool {
    course.instructor == principal.id || principal.is_admin()
}

/// `student_id` comes from the request, not necessarily from the principal.
pub fn can_enroll(_principal: &Principal, course: &Course, student_id: Uuid) -> bool {
    !course.students.contains(&student_id)
}

#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    CreateCourse,
    UpdateCourse(&'a Course),
    DeleteCourse(&'a Course),
    Enroll { course: &'a Course, student_id: Uuid },
}

/// Maps a denied decision onto the error the route returns.
pub fn authorize(principal: &Principal, action: Action<'_>) -> Result<(), AppError> {
    match action {
        Action::CreateCourse => {
            if can_create_course(principal) {
                Ok(())
            } else {
                Err(AppError::Forbidden("Only instructor can post a new course."))
            }
        }
        Action::UpdateCourse(course) => {
            if can_mutate_course(principal, course) {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Only the instructor of this course or web admin can edit this course.",
                ))
            }
        }
        Action::DeleteCourse(course) => {
            if can_mutate_course(principal, course) {
                Ok(())
            } else {
                Err(AppError::Forbidden(
                    "Only the instructor of this course or web admin can delete this course.",
                ))
            }
        }
        Action::Enroll { course, student_id } => {
            if can_enroll(principal, course, student_id) {
                Ok(())
            } else {
                Err(AppError::AlreadyEnrolled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::Role;
    use time::OffsetDateTime;

    fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            email: format!("{role}@example.com"),
            role,
        }
    }

    fn course_owned_by(owner: Uuid) -> Course {
        Course {
            id: Uuid::new_v4(),
            title: "Intro to Rust".into(),
            description: "ownership".into(),
            price: 100.0,
            instructor: owner,
            students: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn only_non_students_create_courses() {
        assert!(!can_create_course(&principal(Role::Student)));
        assert!(can_create_course(&principal(Role::Instructor)));
        assert!(can_create_course(&principal(Role::Admin)));
    }

    #[test]
    fn owner_and_admin_may_mutate() {
        let owner = principal(Role::Instructor);
        let other = principal(Role::Instructor);
        let admin = principal(Role::Admin);
        let course = course_owned_by(owner.id);

        assert!(can_mutate_course(&owner, &course));
        assert!(!can_mutate_course(&other, &course));
        assert!(can_mutate_course(&admin, &course));
    }

    #[test]
    fn enrolled_student_still_cannot_mutate() {
        let student = principal(Role::Student);
        let mut course = course_owned_by(Uuid::new_v4());
        course.students.push(student.id);
        assert!(!can_mutate_course(&student, &course));
        assert!(matches!(
            authorize(&student, Action::UpdateCourse(&course)),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            authorize(&student, Action::DeleteCourse(&course)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn enrollment_is_refused_once_present() {
        let student = principal(Role::Student);
        let mut course = course_owned_by(Uuid::new_v4());
        assert!(can_enroll(&student, &course, student.id));
        course.students.push(student.id);
        assert!(!can_enroll(&student, &course, student.id));
        assert!(matches!(
            authorize(
                &student,
                Action::Enroll {
                    course: &course,
                    student_id: student.id
                }
            ),
            Err(AppError::AlreadyEnrolled)
        ));
    }

    #[test]
    fn enrollment_target_may_differ_from_principal() {
        let instructor = principal(Role::Instructor);
        let target = Uuid::new_v4();
        let course = course_owned_by(instructor.id);
        assert!(authorize(
            &instructor,
            Action::Enroll {
                course: &course,
                student_id: target
            }
        )
        .is_ok());
    }

    #[test]
    fn create_denial_names_the_rule() {
        let err = authorize(&principal(Role::Student), Action::CreateCourse).unwrap_err();
        assert_eq!(err.to_string(), "Only instructor can post a new course.");
        assert!(authorize(&principal(Role::Instructor), Action::CreateCourse).is_ok());
    }

    #[test]
    fn owner_and_admin_pass_mutations() {
        let owner = principal(Role::Instructor);
        let admin = principal(Role::Admin);
        let course = course_owned_by(owner.id);
        for who in [&owner, &admin] {
            assert!(authorize(who, Action::UpdateCourse(&course)).is_ok());
            assert!(authorize(who, Action::DeleteCourse(&course)).is_ok());
        }
    }
}
