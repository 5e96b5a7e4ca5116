use crate::{api::ApiClient, error::GradebookResult};
use serde::{Deserialize, Deserializer, Serialize};

pub mod grade;
pub mod module;
pub mod registration;
pub mod student;

pub trait DataType: Sized {
    type Id;
    type FormForAdding;

    async fn get_by_id(id: Self::Id, api: &ApiClient) -> GradebookResult<Option<Self>>;
    async fn get_all(api: &ApiClient) -> GradebookResult<Vec<Self>>;
    async fn insert(to_be_added: Self::FormForAdding, api: &ApiClient) -> GradebookResult<()>;
}

/// Reference to a student as the API expects it inside grade and registration payloads.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudentRef {
    pub id: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    pub code: String,
}

/// `null` reads as the default, same as a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
