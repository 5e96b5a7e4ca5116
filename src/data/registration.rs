use crate::{
    api::ApiClient,
    data::{DataType, ModuleRef, StudentRef, module::Module, student::Student},
    error::GradebookResult,
    listing::{Listable, SortColumn},
};
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, cmp::Ordering};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Registration {
    pub id: Option<i64>,
    pub student: Student,
    pub module: Module,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub student: StudentRef,
    pub module: ModuleRef,
}

impl NewRegistration {
    pub fn new(student_id: i64, module_code: impl Into<String>) -> Self {
        Self {
            student: StudentRef { id: student_id },
            module: ModuleRef {
                code: module_code.into(),
            },
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AddRegistrationForm {
    pub student_id: i64,
    pub module_code: String,
}

impl From<AddRegistrationForm> for NewRegistration {
    fn from(form: AddRegistrationForm) -> Self {
        Self::new(form.student_id, form.module_code)
    }
}

impl Registration {
    pub async fn remove(student_id: i64, module_code: &str, api: &ApiClient) -> GradebookResult<()> {
        info!(student_id, module_code, "removing registration");
        api.delete(&["registrations", &student_id.to_string(), module_code])
            .await
    }
}

impl DataType for Registration {
    type Id = (i64, String);
    type FormForAdding = NewRegistration;

    async fn get_by_id((student_id, module_code): Self::Id, api: &ApiClient) -> GradebookResult<Option<Self>> {
        Ok(Self::get_all(api).await?.into_iter().find(|registration| {
            registration.student.id == student_id && registration.module.code == module_code
        }))
    }

    async fn get_all(api: &ApiClient) -> GradebookResult<Vec<Self>> {
        api.get_list(&["registrations"]).await
    }

    async fn insert(to_be_added: NewRegistration, api: &ApiClient) -> GradebookResult<()> {
        debug!(
            student = to_be_added.student.id,
            module = ?to_be_added.module.code,
            "posting registration"
        );
        api.post(&["registrations"], &to_be_added).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationColumn {
    Student,
    Module,
}

impl SortColumn for RegistrationColumn {
    const ALL: &'static [Self] = &[Self::Student, Self::Module];

    fn name(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Module => "module",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Module => "Module",
        }
    }
}

impl Listable for Registration {
    type Column = RegistrationColumn;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(&self.student.first_name),
            Cow::Borrowed(&self.module.name),
        ]
    }

    fn compare_by(&self, other: &Self, column: RegistrationColumn) -> Ordering {
        match column {
            RegistrationColumn::Student => self
                .student
                .first_name
                .cmp(&other.student.first_name)
                .then(self.student.id.cmp(&other.student.id)),
            RegistrationColumn::Module => self.module.name.cmp(&other.module.name),
        }
    }
}
