//! Route Table Module Index
//!
//! The static route surface of the school portal, split by access segment the same way
//! the views are: public pages, admin pages, teacher pages, student pages, and the
//! redirect-only legacy entries. `RouteTable::standard()` merges them, most specific first.

use std::{collections::BTreeMap, sync::LazyLock};

use crate::{
    landing,
    models::{Role, RouteInfo, Session},
};

/// Pages reachable without a session.
pub mod public;

/// Pages restricted to the 'admin' role.
pub mod admin;

/// Pages restricted to verified teachers, plus the student profile view.
pub mod teacher;

/// Pages restricted to the 'student' role.
pub mod student;

/// Redirect-only entries resolved before guard evaluation.
pub mod redirects;

/// Concrete paths and patterns of the route surface.
pub mod paths {
    pub const ROOT: &str = "/";
    pub const REGISTER: &str = "/register";
    pub const LOGIN: &str = "/login";
    pub const ACCOUNT_NOT_VERIFIED: &str = "/account-not-verified";

    pub const ADMIN_TEACHERS: &str = "/admin/teachers";
    pub const ADMIN_GENERATE_STUDENTS: &str = "/admin/generate-students";

    pub const TEACHER_SELECT_GRADE: &str = "/teacher/select-grade";
    pub const TEACHER_TASKS: &str = "/teacher/tasks";
    pub const TEACHER_CLASS: &str = "/teacher/class/:grade";
    pub const TEACHER_CLASS_TASKS: &str = "/teacher/class/:grade/tasks";
    pub const TEACHER_CLASS_ATTENDANCE: &str = "/teacher/class/:grade/attendance";
    pub const TEACHER_CLASS_GRADES: &str = "/teacher/class/:grade/grades";
    pub const STUDENT_PROFILE: &str = "/teacher/class/:grade/student/:studentId";

    pub const STUDENT_TASKS: &str = "/student/tasks";
    pub const STUDENT_GRADES: &str = "/student/grades";
}

/// Name of the path parameter that identifies the student on the profile view.
pub const STUDENT_ID_PARAM: &str = "studentId";

/// Page
///
/// Opaque reference to the view a route renders. The guard never inspects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Register,
    Login,
    AccountNotVerified,
    AdminTeachers,
    AdminGenerateStudents,
    TeacherSelectGrade,
    TeacherClassTasks,
    TeacherClassAttendance,
    TeacherClassGrades,
    StudentProfile,
    StudentTasks,
}

impl Page {
    pub fn name(&self) -> &'static str {
        match self {
            Page::Register => "Register",
            Page::Login => "Login",
            Page::AccountNotVerified => "AccountNotVerified",
            Page::AdminTeachers => "AdminTeachers",
            Page::AdminGenerateStudents => "AdminGenerateStudents",
            Page::TeacherSelectGrade => "TeacherSelectGrade",
            Page::TeacherClassTasks => "TeacherClassTasks",
            Page::TeacherClassAttendance => "TeacherClassAttendance",
            Page::TeacherClassGrades => "TeacherClassGrades",
            Page::StudentProfile => "StudentProfile",
            Page::StudentTasks => "StudentTasks",
        }
    }
}

/// RouteSpec
///
/// Static declaration of a page's access requirements.
///
/// Note that `required_role = Some(Role::Teacher)` does not encode the verification
/// requirement; the guard adds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSpec {
    pub requires_auth: bool,
    pub required_role: Option<Role>,
    /// When set, a student may only open the route if this path parameter equals their id.
    pub owner_param: Option<&'static str>,
    pub page: Page,
}

impl RouteSpec {
    pub const fn public(page: Page) -> Self {
        Self {
            requires_auth: false,
            required_role: None,
            owner_param: None,
            page,
        }
    }

    pub const fn role(role: Role, page: Page) -> Self {
        Self {
            requires_auth: true,
            required_role: Some(role),
            owner_param: None,
            page,
        }
    }

    /// Authenticated, no role requirement, ownership checked against `param`.
    pub const fn owned_by(param: &'static str, page: Page) -> Self {
        Self {
            requires_auth: true,
            required_role: None,
            owner_param: Some(param),
            page,
        }
    }
}

/// RedirectRule
///
/// How a redirect-only entry computes its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectRule {
    /// Fixed target. `:name` segments are filled from the matched path parameters.
    To(&'static str),
    /// Landing page of the session's role.
    RoleLanding,
    /// Legacy student grades page, now the student's own profile view.
    StudentGrades,
}

impl RedirectRule {
    pub fn target(&self, params: &RouteParams, session: &Session) -> String {
        match self {
            RedirectRule::To(template) => fill_template(template, params),
            RedirectRule::RoleLanding => landing::default_landing(session.role).to_string(),
            RedirectRule::StudentGrades => landing::student_grades_landing(session),
        }
    }

    fn describe(&self) -> String {
        match self {
            RedirectRule::To(template) => template.to_string(),
            RedirectRule::RoleLanding => "role landing".to_string(),
            RedirectRule::StudentGrades => "student profile".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    Page(RouteSpec),
    Redirect(RedirectRule),
}

/// RouteParams
///
/// Named path parameters captured by a pattern match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(BTreeMap<String, String>);

impl RouteParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Pattern
///
/// A path pattern such as `/teacher/class/:grade/tasks`. Matching is segment-exact:
/// same number of segments, literal segments equal ignoring ASCII case (the browser
/// router renders `/ADMIN/teachers` as the admin page), `:name` segments capture one
/// non-empty segment as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: &'static str,
    segments: Vec<Segment>,
}

impl Pattern {
    pub fn parse(raw: &'static str) -> Self {
        let segments = split_path(raw)
            .into_iter()
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(segment.to_string()),
            })
            .collect();
        Self { raw, segments }
    }

    pub fn as_str(&self) -> &'static str {
        self.raw
    }

    pub fn matches(&self, path_segments: &[&str]) -> Option<RouteParams> {
        if self.segments.len() != path_segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, actual) in self.segments.iter().zip(path_segments) {
            match segment {
                Segment::Literal(expected) if expected.eq_ignore_ascii_case(actual) => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*actual).to_string());
                }
            }
        }
        Some(RouteParams(params))
    }
}

/// Splits a concrete path into its non-empty segments, ignoring query and fragment.
pub fn split_path(path: &str) -> Vec<&str> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].split('/').filter(|s| !s.is_empty()).collect()
}

/// Canonical form of a concrete path: leading slash, no trailing slash, no query.
pub fn normalize_path(path: &str) -> String {
    format!("/{}", split_path(path).join("/"))
}

fn fill_template(template: &str, params: &RouteParams) -> String {
    let filled: Vec<&str> = split_path(template)
        .into_iter()
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => params.get(name).unwrap_or(segment),
            None => segment,
        })
        .collect();
    format!("/{}", filled.join("/"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub pattern: Pattern,
    pub target: RouteTarget,
}

/// RouteMatch
///
/// The single entry matching a concrete path, with its captured parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub params: RouteParams,
}

/// RouteTable
///
/// Ordered list of route entries. The first entry whose pattern matches wins, so more
/// specific patterns are registered first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

static STANDARD: LazyLock<RouteTable> = LazyLock::new(|| {
    RouteTable::new()
        .merge(teacher::teacher_routes())
        .merge(admin::admin_routes())
        .merge(student::student_routes())
        .merge(redirects::redirect_routes())
        .merge(public::public_routes())
});

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The school portal's route surface.
    pub fn standard() -> &'static RouteTable {
        &STANDARD
    }

    pub fn page(mut self, pattern: &'static str, spec: RouteSpec) -> Self {
        self.entries.push(RouteEntry {
            pattern: Pattern::parse(pattern),
            target: RouteTarget::Page(spec),
        });
        self
    }

    pub fn redirect(mut self, pattern: &'static str, rule: RedirectRule) -> Self {
        self.entries.push(RouteEntry {
            pattern: Pattern::parse(pattern),
            target: RouteTarget::Redirect(rule),
        });
        self
    }

    pub fn merge(mut self, other: RouteTable) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// lookup
    ///
    /// Returns the entry for a concrete path, or `None` when no pattern matches (the path
    /// is then treated as a public, unauthenticated route).
    pub fn lookup(&self, path: &str) -> Option<RouteMatch<'_>> {
        let segments = split_path(path);
        self.entries.iter().find_map(|entry| {
            entry
                .pattern
                .matches(&segments)
                .map(|params| RouteMatch { entry, params })
        })
    }

    pub fn describe(&self) -> Vec<RouteInfo> {
        self.entries
            .iter()
            .map(|entry| match entry.target {
                RouteTarget::Page(spec) => RouteInfo {
                    pattern: entry.pattern.as_str().to_string(),
                    requires_auth: spec.requires_auth,
                    required_role: spec.required_role,
                    owner_param: spec.owner_param.map(str::to_string),
                    page: Some(spec.page.name().to_string()),
                    redirect: None,
                },
                RouteTarget::Redirect(rule) => RouteInfo {
                    pattern: entry.pattern.as_str().to_string(),
                    requires_auth: false,
                    required_role: None,
                    owner_param: None,
                    page: None,
                    redirect: Some(rule.describe()),
                },
            })
            .collect()
    }
}
