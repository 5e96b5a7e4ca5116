use crate::{
    api::ApiClient,
    data::{DataType, ModuleRef, StudentRef, module::Module, student::Student},
    error::{GradebookResult, ScoreNotANumberSnafu, ScoreOutOfRangeSnafu},
    listing::{Listable, SortColumn},
};
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ensure};
use std::{borrow::Cow, cmp::Ordering};

pub const PASS_MARK: i32 = 40;
pub const MAX_SCORE: i32 = 100;

/// A grade as returned by the API, with the student and module embedded.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Grade {
    pub id: Option<i64>,
    pub score: i32,
    pub student: Student,
    pub module: Module,
}

impl Grade {
    pub fn is_fail(&self) -> bool {
        self.score < PASS_MARK
    }

    pub fn for_pair<'a>(grades: &'a [Self], student_id: i64, module_code: &str) -> Option<&'a Self> {
        grades
            .iter()
            .find(|g| g.student.id == student_id && g.module.code == module_code)
    }
}

/// Create payload. Posting one for a pair that already has a grade is how grades get updated.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NewGrade {
    pub score: i32,
    pub student: StudentRef,
    pub module: ModuleRef,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AddGradeForm {
    pub student_id: i64,
    pub module_code: String,
    pub score: String,
}

pub fn parse_score(raw: &str) -> GradebookResult<i32> {
    let raw = raw.trim();
    let score = raw
        .parse::<i32>()
        .ok()
        .context(ScoreNotANumberSnafu { original: raw })?;
    ensure!((0..=MAX_SCORE).contains(&score), ScoreOutOfRangeSnafu { score });
    Ok(score)
}

impl TryFrom<AddGradeForm> for NewGrade {
    type Error = crate::error::GradebookError;

    fn try_from(form: AddGradeForm) -> GradebookResult<Self> {
        Ok(Self {
            score: parse_score(&form.score)?,
            student: StudentRef {
                id: form.student_id,
            },
            module: ModuleRef {
                code: form.module_code,
            },
        })
    }
}

impl DataType for Grade {
    type Id = i64;
    type FormForAdding = NewGrade;

    // the API only lists grades in bulk
    async fn get_by_id(id: i64, api: &ApiClient) -> GradebookResult<Option<Self>> {
        Ok(Self::get_all(api)
            .await?
            .into_iter()
            .find(|grade| grade.id == Some(id)))
    }

    async fn get_all(api: &ApiClient) -> GradebookResult<Vec<Self>> {
        api.get_list(&["grades"]).await
    }

    async fn insert(to_be_added: NewGrade, api: &ApiClient) -> GradebookResult<()> {
        info!(
            student = to_be_added.student.id,
            module = ?to_be_added.module.code,
            score = to_be_added.score,
            "posting grade"
        );
        api.post(&["grades"], &to_be_added).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeColumn {
    Student,
    Module,
    Score,
}

impl SortColumn for GradeColumn {
    const ALL: &'static [Self] = &[Self::Student, Self::Module, Self::Score];

    fn name(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Module => "module",
            Self::Score => "score",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Module => "Module",
            Self::Score => "Score",
        }
    }
}

impl Listable for Grade {
    type Column = GradeColumn;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(&self.student.first_name),
            Cow::Borrowed(&self.student.last_name),
            Cow::Borrowed(&self.module.code),
            Cow::Borrowed(&self.module.name),
        ]
    }

    fn compare_by(&self, other: &Self, column: GradeColumn) -> Ordering {
        match column {
            GradeColumn::Student => self.student.id.cmp(&other.student.id),
            GradeColumn::Module => self.module.code.cmp(&other.module.code),
            GradeColumn::Score => self.score.cmp(&other.score),
        }
    }
}
