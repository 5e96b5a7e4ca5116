//! Aggregates over already-fetched lists: averages, failing students, the top student and the
//! dashboard counts.

use crate::data::{
    grade::{Grade, PASS_MARK},
    module::Module,
    registration::Registration,
    student::Student,
};
use std::collections::HashSet;

/// Arithmetic mean rounded to two decimals, or `None` for no scores.
pub fn average(scores: impl IntoIterator<Item = i32>) -> Option<f64> {
    let (total, count) = scores
        .into_iter()
        .fold((0_i64, 0_u32), |(total, count), score| {
            (total + i64::from(score), count + 1)
        });

    if count == 0 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = total as f64 / f64::from(count);
    Some(round_2dp(mean))
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Averages shown on screen treat "no grades" as zero.
pub fn display_average(average: Option<f64>) -> String {
    format!("{:.2}", average.unwrap_or_default())
}

/// Averages written to exports spell "no grades" out.
pub fn export_average(average: Option<f64>) -> String {
    average.map_or_else(|| "N/A".to_string(), |a| format!("{a:.2}"))
}

pub fn student_average(grades: &[Grade], student_id: i64) -> Option<f64> {
    average(
        grades
            .iter()
            .filter(|g| g.student.id == student_id)
            .map(|g| g.score),
    )
}

pub fn module_average(grades: &[Grade], module_code: &str) -> Option<f64> {
    average(
        grades
            .iter()
            .filter(|g| g.module.code == module_code)
            .map(|g| g.score),
    )
}

pub fn is_failing_average(average: Option<f64>) -> bool {
    average.unwrap_or_default() < f64::from(PASS_MARK)
}

/// Students with at least one grade under the pass mark, in the order given.
pub fn failed_students<'a>(students: &'a [Student], grades: &[Grade]) -> Vec<&'a Student> {
    let failing: HashSet<i64> = grades
        .iter()
        .filter(|g| g.is_fail())
        .map(|g| g.student.id)
        .collect();

    students
        .iter()
        .filter(|s| failing.contains(&s.id))
        .collect()
}

/// Names of the modules a student scored under the pass mark in.
pub fn failed_modules(grades: &[Grade], student_id: i64) -> Vec<&str> {
    grades
        .iter()
        .filter(|g| g.student.id == student_id && g.is_fail())
        .map(|g| g.module.name.as_str())
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopStudent<'a> {
    pub student: &'a Student,
    pub average: f64,
}

/// The student with the strictly highest average above zero; the first one seen wins a tie.
pub fn top_student<'a>(students: &'a [Student], grades: &[Grade]) -> Option<TopStudent<'a>> {
    students
        .iter()
        .fold(None, |best: Option<TopStudent<'a>>, student| {
            let Some(average) = student_average(grades, student.id) else {
                return best;
            };
            let threshold = best.as_ref().map_or(0.0, |b| b.average);

            if average > threshold {
                Some(TopStudent { student, average })
            } else {
                best
            }
        })
}

/// Students with no registration at all.
pub fn unregistered_students<'a>(
    students: &'a [Student],
    registrations: &[Registration],
) -> Vec<&'a Student> {
    let registered: HashSet<i64> = registrations.iter().map(|r| r.student.id).collect();
    students
        .iter()
        .filter(|s| !registered.contains(&s.id))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub students: usize,
    pub modules: usize,
    pub grades: usize,
    pub registrations: usize,
    pub unregistered_students: usize,
}

impl Counts {
    pub fn new(
        students: &[Student],
        modules: &[Module],
        grades: &[Grade],
        registrations: &[Registration],
    ) -> Self {
        Self {
            students: students.len(),
            modules: modules.len(),
            grades: grades.len(),
            registrations: registrations.len(),
            unregistered_students: unregistered_students(students, registrations).len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleAverage<'a> {
    pub module: &'a Module,
    pub average: Option<f64>,
}

pub fn module_averages<'a>(modules: &'a [Module], grades: &[Grade]) -> Vec<ModuleAverage<'a>> {
    modules
        .iter()
        .map(|module| ModuleAverage {
            module,
            average: module_average(grades, &module.code),
        })
        .collect()
}

pub const STUDENT_EXPORT_HEADERS: [&str; 4] =
    ["Student ID", "First Name", "Last Name", "Average Grade"];
pub const MODULE_EXPORT_HEADERS: [&str; 3] = ["Module Code", "Module Name", "Average Grade"];

pub fn student_export_rows(students: &[Student], grades: &[Grade]) -> Vec<[String; 4]> {
    students
        .iter()
        .map(|s| {
            [
                s.id.to_string(),
                s.first_name.clone(),
                s.last_name.clone(),
                export_average(student_average(grades, s.id)),
            ]
        })
        .collect()
}

pub fn module_export_rows(modules: &[Module], grades: &[Grade]) -> Vec<[String; 3]> {
    module_averages(modules, grades)
        .into_iter()
        .map(|ma| {
            [
                ma.module.code.clone(),
                ma.module.name.clone(),
                export_average(ma.average),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: i64, first_name: &str) -> Student {
        Student {
            id,
            first_name: first_name.into(),
            last_name: "Test".into(),
            ..Student::default()
        }
    }

    fn module(code: &str) -> Module {
        Module {
            code: code.into(),
            name: format!("{code} name"),
            mnc: false,
        }
    }

    fn grade(student_id: i64, code: &str, score: i32) -> Grade {
        Grade {
            id: None,
            score,
            student: Student {
                id: student_id,
                ..Student::default()
            },
            module: module(code),
        }
    }

    #[test]
    fn averages_round_to_two_places() {
        assert_eq!(average([78, 72]), Some(75.0));
        assert_eq!(average([74, 68, 63]), Some(68.33));
        assert_eq!(average([1, 2]), Some(1.5));
        assert_eq!(average(Vec::<i32>::new()), None);

        assert_eq!(display_average(average([74, 68, 63])), "68.33");
        assert_eq!(display_average(None), "0.00");
        assert_eq!(export_average(None), "N/A");
        assert_eq!(export_average(Some(75.0)), "75.00");
    }

    #[test]
    fn per_student_and_per_module() {
        let grades = vec![
            grade(1, "COMP0010", 78),
            grade(1, "MATH0021", 72),
            grade(2, "COMP0010", 33),
        ];

        assert_eq!(student_average(&grades, 1), Some(75.0));
        assert_eq!(student_average(&grades, 3), None);
        assert_eq!(module_average(&grades, "COMP0010"), Some(55.5));
        assert!(is_failing_average(student_average(&grades, 2)));
        assert!(!is_failing_average(student_average(&grades, 1)));
    }

    #[test]
    fn failing_means_any_grade_under_forty() {
        let students = vec![student(1, "Oliver"), student(2, "Maya"), student(10, "Hugo")];
        let grades = vec![
            grade(1, "COMP0010", 78),
            grade(2, "COMP0010", 33),
            grade(2, "MATH0021", 95),
            grade(10, "COMP0034", 40),
        ];

        let failed: Vec<_> = failed_students(&students, &grades)
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(failed, [2]);

        assert_eq!(failed_modules(&grades, 2), ["COMP0010 name"]);
        assert!(failed_modules(&grades, 10).is_empty());
    }

    #[test]
    fn top_student_needs_a_strictly_higher_average() {
        let students = vec![student(1, "Oliver"), student(2, "Maya"), student(3, "Luca")];
        let grades = vec![
            grade(1, "COMP0010", 80),
            grade(2, "COMP0010", 94),
            grade(3, "COMP0010", 94),
        ];

        let top = top_student(&students, &grades).unwrap();
        assert_eq!(top.student.id, 2);
        assert_eq!(top.average, 94.0);

        let zeroes = vec![grade(1, "COMP0010", 0)];
        assert!(top_student(&students, &zeroes).is_none());
        assert!(top_student(&students, &[]).is_none());
    }

    #[test]
    fn counts_unregistered_students() {
        let students = vec![student(1, "Oliver"), student(2, "Maya")];
        let modules = vec![module("COMP0010")];
        let registrations = vec![Registration {
            id: None,
            student: student(1, "Oliver"),
            module: module("COMP0010"),
        }];

        let counts = Counts::new(&students, &modules, &[], &registrations);
        assert_eq!(
            counts,
            Counts {
                students: 2,
                modules: 1,
                grades: 0,
                registrations: 1,
                unregistered_students: 1,
            }
        );
    }

    #[test]
    fn export_rows_spell_out_missing_averages() {
        let students = vec![student(1, "Oliver"), student(2, "Maya")];
        let modules = vec![module("COMP0010"), module("PHYS0011")];
        let grades = vec![grade(1, "COMP0010", 74), grade(1, "COMP0010", 68)];

        let rows = student_export_rows(&students, &grades);
        assert_eq!(rows[0], ["1", "Oliver", "Test", "71.00"].map(String::from));
        assert_eq!(rows[1][3], "N/A");

        let rows = module_export_rows(&modules, &grades);
        assert_eq!(rows[0][2], "71.00");
        assert_eq!(rows[1][2], "N/A");
    }
}
