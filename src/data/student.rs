use crate::{
    api::ApiClient,
    data::{DataType, grade::Grade, module::Module, null_as_default},
    error::{EmailSnafu, EmptyFieldSnafu, GradebookResult, ParseStudentIdSnafu},
    listing::{Listable, SortColumn},
};
use email_address::EmailAddress;
use maud::{Markup, Render, html};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, ensure};
use std::{borrow::Cow, cmp::Ordering, str::FromStr};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Student {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_name: String,
}

/// The add-student form as typed; the id is caller-assigned.
#[derive(Deserialize, Debug, Clone)]
pub struct AddStudentForm {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl TryFrom<AddStudentForm> for Student {
    type Error = crate::error::GradebookError;

    fn try_from(form: AddStudentForm) -> GradebookResult<Self> {
        let id = form.id.trim();
        let id = id
            .parse::<i64>()
            .context(ParseStudentIdSnafu { original: id })?;

        let username = form.username.trim();
        ensure!(!username.is_empty(), EmptyFieldSnafu { field: "Username" });
        let first_name = form.first_name.trim();
        ensure!(!first_name.is_empty(), EmptyFieldSnafu { field: "First name" });
        let last_name = form.last_name.trim();
        ensure!(!last_name.is_empty(), EmptyFieldSnafu { field: "Last name" });

        let email = EmailAddress::from_str(form.email.trim()).context(EmailSnafu)?;

        Ok(Self {
            id,
            username: username.to_string(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        })
    }
}

impl Student {
    pub async fn grades(id: i64, api: &ApiClient) -> GradebookResult<Vec<Grade>> {
        api.get_list_or_empty(&["students", &id.to_string(), "grades"])
            .await
    }

    pub async fn modules(id: i64, api: &ApiClient) -> GradebookResult<Vec<Module>> {
        api.get_list(&["students", &id.to_string(), "modules"]).await
    }

    pub async fn remove(id: i64, api: &ApiClient) -> GradebookResult<()> {
        api.delete(&["students", &id.to_string()]).await
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl DataType for Student {
    type Id = i64;
    type FormForAdding = Self;

    async fn get_by_id(id: Self::Id, api: &ApiClient) -> GradebookResult<Option<Self>> {
        api.get_one(&["students", &id.to_string()]).await
    }

    async fn get_all(api: &ApiClient) -> GradebookResult<Vec<Self>> {
        api.get_list(&["students"]).await
    }

    async fn insert(to_be_added: Self, api: &ApiClient) -> GradebookResult<()> {
        info!(id = to_be_added.id, username = ?to_be_added.username, "adding student");
        api.post(&["students"], &to_be_added).await
    }
}

impl Render for Student {
    fn render(&self) -> Markup {
        html! {
            (self.first_name) " " (self.last_name)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentColumn {
    Id,
    FirstName,
    LastName,
    Username,
    Email,
}

impl SortColumn for StudentColumn {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::FirstName,
        Self::LastName,
        Self::Username,
        Self::Email,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Username => "username",
            Self::Email => "email",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Id => "Student ID",
            Self::FirstName => "First Name",
            Self::LastName => "Last Name",
            Self::Username => "Username",
            Self::Email => "Email",
        }
    }
}

impl Listable for Student {
    type Column = StudentColumn;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Owned(self.id.to_string()),
            Cow::Borrowed(&self.first_name),
            Cow::Borrowed(&self.last_name),
            Cow::Borrowed(&self.username),
            Cow::Borrowed(&self.email),
        ]
    }

    fn compare_by(&self, other: &Self, column: StudentColumn) -> Ordering {
        match column {
            StudentColumn::Id => self.id.cmp(&other.id),
            StudentColumn::FirstName => self.first_name.cmp(&other.first_name),
            StudentColumn::LastName => self.last_name.cmp(&other.last_name),
            StudentColumn::Username => self.username.cmp(&other.username),
            StudentColumn::Email => self.email.cmp(&other.email),
        }
    }
}
