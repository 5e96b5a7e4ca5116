use crate::{
    api::ApiClient,
    data::{DataType, grade::Grade, null_as_default, student::Student},
    error::{EmptyFieldSnafu, GradebookResult},
    listing::{Listable, SortColumn},
};
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::{borrow::Cow, cmp::Ordering};

/// A taught module, keyed by its code. `mnc` marks it as mandatory: every student is registered
/// for it and nobody can be unregistered from it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Module {
    #[serde(deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub mnc: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AddModuleForm {
    pub code: String,
    pub name: String,
    // checkboxes only show up when ticked
    pub mnc: Option<String>,
}

impl TryFrom<AddModuleForm> for Module {
    type Error = crate::error::GradebookError;

    fn try_from(form: AddModuleForm) -> GradebookResult<Self> {
        let code = form.code.trim();
        ensure!(!code.is_empty(), EmptyFieldSnafu { field: "Module code" });
        let name = form.name.trim();
        ensure!(!name.is_empty(), EmptyFieldSnafu { field: "Module name" });

        Ok(Self {
            code: code.to_string(),
            name: name.to_string(),
            mnc: form.mnc.is_some_and(|v| v == "on" || v == "true"),
        })
    }
}

impl Module {
    pub async fn grades(code: &str, api: &ApiClient) -> GradebookResult<Vec<Grade>> {
        api.get_list_or_empty(&["modules", code, "grades"]).await
    }

    pub async fn students(code: &str, api: &ApiClient) -> GradebookResult<Vec<Student>> {
        api.get_list(&["modules", code, "students"]).await
    }

    pub async fn remove(code: &str, api: &ApiClient) -> GradebookResult<()> {
        api.delete(&["modules", code]).await
    }

    pub const fn mandatory_label(&self) -> &'static str {
        if self.mnc { "Yes" } else { "No" }
    }
}

impl DataType for Module {
    type Id = String;
    type FormForAdding = Self;

    // there is no single-module endpoint
    async fn get_by_id(code: String, api: &ApiClient) -> GradebookResult<Option<Self>> {
        Ok(Self::get_all(api)
            .await?
            .into_iter()
            .find(|module| module.code == code))
    }

    async fn get_all(api: &ApiClient) -> GradebookResult<Vec<Self>> {
        api.get_list(&["modules"]).await
    }

    async fn insert(to_be_added: Self, api: &ApiClient) -> GradebookResult<()> {
        info!(code = ?to_be_added.code, mnc = to_be_added.mnc, "adding module");
        api.post(&["modules"], &to_be_added).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleColumn {
    Code,
    Name,
    Mandatory,
}

impl SortColumn for ModuleColumn {
    const ALL: &'static [Self] = &[Self::Code, Self::Name, Self::Mandatory];

    fn name(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Name => "name",
            Self::Mandatory => "mnc",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Code => "Module Code",
            Self::Name => "Module Name",
            Self::Mandatory => "Mandatory",
        }
    }
}

impl Listable for Module {
    type Column = ModuleColumn;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(&self.code), Cow::Borrowed(&self.name)]
    }

    fn compare_by(&self, other: &Self, column: ModuleColumn) -> Ordering {
        match column {
            ModuleColumn::Code => self.code.cmp(&other.code),
            ModuleColumn::Name => self.name.cmp(&other.name),
            ModuleColumn::Mandatory => self.mnc.cmp(&other.mnc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{SortState, filter_and_sort};

    #[test]
    fn mandatory_checkbox() {
        let ticked = Module::try_from(AddModuleForm {
            code: "COMP0010".into(),
            name: "Algorithms and Data Structures".into(),
            mnc: Some("on".into()),
        })
        .unwrap();
        assert!(ticked.mnc);

        let unticked = Module::try_from(AddModuleForm {
            code: "COMP0034".into(),
            name: "Web Engineering".into(),
            mnc: None,
        })
        .unwrap();
        assert!(!unticked.mnc);

        assert!(
            Module::try_from(AddModuleForm {
                code: "  ".into(),
                name: "Nothing".into(),
                mnc: None,
            })
            .is_err()
        );
    }

    #[test]
    fn filter_only_looks_at_code_and_name() {
        let modules = vec![
            Module {
                code: "COMP0010".into(),
                name: "Algorithms and Data Structures".into(),
                mnc: true,
            },
            Module {
                code: "STAT0035".into(),
                name: "Probability & Statistics".into(),
                mnc: false,
            },
        ];

        let codes = |filter: &str| -> Vec<String> {
            filter_and_sort(&modules, filter, SortState::ascending(ModuleColumn::Code))
                .into_iter()
                .map(|m| m.code.clone())
                .collect()
        };

        assert_eq!(codes("comp"), ["COMP0010"]);
        assert_eq!(codes("STATISTICS"), ["STAT0035"]);
        assert_eq!(codes("00"), ["COMP0010", "STAT0035"]);
        assert!(codes("true").is_empty());
    }
}
