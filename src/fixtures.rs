//! The sample cohort loaded by the "load sample data" button.
//!
//! Ten students take the two mandatory modules (the API registers those on its own when a
//! student or mandatory module is created) plus a handful of optional ones.

use crate::{
    api::ApiClient,
    data::{
        DataType, ModuleRef, StudentRef,
        grade::{Grade, NewGrade},
        module::Module,
        registration::{NewRegistration, Registration},
        student::Student,
    },
    error::{GradebookResult, SeedSampleDataSnafu},
};
use futures::future::join_all;
use snafu::ResultExt;

// (id, username, first name, last name)
const STUDENTS: [(i64, &str, &str, &str); 10] = [
    (1, "oliver.reed", "Oliver", "Reed"),
    (2, "maya.patel", "Maya", "Patel"),
    (3, "luca.rossi", "Luca", "Rossi"),
    (4, "noor.ahmed", "Noor", "Ahmed"),
    (5, "eva.muller", "Eva", "Muller"),
    (6, "kai.tanaka", "Kai", "Tanaka"),
    (7, "priya.shah", "Priya", "Shah"),
    (8, "tomasz.k", "Tomasz", "Kowalski"),
    (9, "amina.diallo", "Amina", "Diallo"),
    (10, "hugo.fernandes", "Hugo", "Fernandes"),
];

const MODULES: [(&str, &str, bool); 6] = [
    ("COMP0010", "Algorithms and Data Structures", true),
    ("MATH0021", "Linear Algebra", true),
    ("COMP0034", "Web Engineering", false),
    ("STAT0035", "Probability & Statistics", false),
    ("ECON0014", "Introduction to Microeconomics", false),
    ("PHYS0011", "Classical Mechanics", false),
];

const OPTIONAL_REGISTRATIONS: [(i64, &str); 28] = [
    (1, "COMP0034"),
    (1, "STAT0035"),
    (1, "ECON0014"),
    (2, "COMP0034"),
    (2, "PHYS0011"),
    (3, "COMP0034"),
    (3, "STAT0035"),
    (3, "ECON0014"),
    (3, "PHYS0011"),
    (4, "STAT0035"),
    (4, "ECON0014"),
    (4, "PHYS0011"),
    (5, "STAT0035"),
    (5, "ECON0014"),
    (6, "COMP0034"),
    (6, "STAT0035"),
    (6, "ECON0014"),
    (6, "PHYS0011"),
    (7, "ECON0014"),
    (7, "STAT0035"),
    (7, "COMP0034"),
    (8, "COMP0034"),
    (8, "STAT0035"),
    (9, "PHYS0011"),
    (9, "ECON0014"),
    (9, "STAT0035"),
    (10, "COMP0034"),
    (10, "ECON0014"),
];

// (student, COMP0010, MATH0021)
const MANDATORY_SCORES: [(i64, i32, i32); 10] = [
    (1, 78, 72),
    (2, 33, 37),
    (3, 95, 92),
    (4, 67, 61),
    (5, 55, 49),
    (6, 80, 75),
    (7, 62, 57),
    (8, 44, 42),
    (9, 52, 46),
    (10, 41, 43),
];

// same order as OPTIONAL_REGISTRATIONS
const OPTIONAL_SCORES: [i32; 28] = [
    74, 68, 63, //
    35, 29, //
    94, 90, 88, 91, //
    64, 70, 58, //
    52, 47, //
    78, 82, 69, 73, //
    74, 66, 60, //
    59, 61, //
    55, 50, 48, //
    45, 39,
];

pub fn students() -> Vec<Student> {
    STUDENTS
        .iter()
        .map(|&(id, username, first_name, last_name)| Student {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        })
        .collect()
}

pub fn modules() -> Vec<Module> {
    MODULES
        .iter()
        .map(|&(code, name, mnc)| Module {
            code: code.to_string(),
            name: name.to_string(),
            mnc,
        })
        .collect()
}

pub fn registrations() -> Vec<NewRegistration> {
    OPTIONAL_REGISTRATIONS
        .iter()
        .map(|&(id, code)| NewRegistration::new(id, code))
        .collect()
}

pub fn grades() -> Vec<NewGrade> {
    let grade = |id, code: &str, score| NewGrade {
        score,
        student: StudentRef { id },
        module: ModuleRef {
            code: code.to_string(),
        },
    };

    let mandatory = MANDATORY_SCORES.iter().flat_map(|&(id, comp, math)| {
        [grade(id, "COMP0010", comp), grade(id, "MATH0021", math)]
    });
    let optional = OPTIONAL_REGISTRATIONS
        .iter()
        .zip(OPTIONAL_SCORES)
        .map(|(&(id, code), score)| grade(id, code, score));

    mandatory.chain(optional).collect()
}

async fn post_all<T, F, Fut>(items: Vec<T>, post: F) -> GradebookResult<()>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = GradebookResult<()>>,
{
    join_all(items.into_iter().map(post))
        .await
        .into_iter()
        .collect()
}

/// Posts the sample cohort. Each kind refers to the ones before it, so they go in order; within a
/// kind everything is sent at once.
pub async fn seed(api: &ApiClient) -> GradebookResult<()> {
    async {
        post_all(students(), |s| Student::insert(s, api)).await?;
        post_all(modules(), |m| Module::insert(m, api)).await?;
        post_all(registrations(), |r| Registration::insert(r, api)).await?;
        post_all(grades(), |g| Grade::insert(g, api)).await
    }
    .await
    .context(SeedSampleDataSnafu)?;

    info!("sample data loaded");
    Ok(())
}
