use super::{Page, RouteSpec, RouteTable, STUDENT_ID_PARAM, paths};
use crate::models::Role;

/// Teacher Route Table
///
/// Class management views. Every role-restricted entry here additionally requires a
/// verified teacher account, which the guard enforces.
///
/// The student profile view lives under the teacher's class path but carries no role
/// requirement: teachers may open any profile, students only their own (`studentId`
/// must equal their user id).
pub fn teacher_routes() -> RouteTable {
    RouteTable::new()
        // Most specific first: the profile view has the most segments.
        .page(
            paths::STUDENT_PROFILE,
            RouteSpec::owned_by(STUDENT_ID_PARAM, Page::StudentProfile),
        )
        .page(
            paths::TEACHER_CLASS_TASKS,
            RouteSpec::role(Role::Teacher, Page::TeacherClassTasks),
        )
        .page(
            paths::TEACHER_CLASS_ATTENDANCE,
            RouteSpec::role(Role::Teacher, Page::TeacherClassAttendance),
        )
        .page(
            paths::TEACHER_CLASS_GRADES,
            RouteSpec::role(Role::Teacher, Page::TeacherClassGrades),
        )
        .page(
            paths::TEACHER_SELECT_GRADE,
            RouteSpec::role(Role::Teacher, Page::TeacherSelectGrade),
        )
}
