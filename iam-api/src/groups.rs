use iam_lib::ids;
use iam_lib::validation;
use serde::{Serialize, Deserialize};

use crate::{Validator, ApiError, Detail};
use crate::error::GeneralKind;

#[derive(Debug, Serialize, Deserialize)]
pub struct ListItem {
    pub gid: ids::GroupUid,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Group {
    pub gid: ids::GroupUid,
    pub name: Option<String>,
    pub users: Vec<ids::UserUid>,
    pub policies: Vec<ids::PolicyUid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Validator for CreateGroup {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            if !validation::alias_valid(name) {
                return Err(ApiError::from((
                    GeneralKind::ValidationFailed,
                    Detail::with_key("name")
                )));
            }
        }

        Ok(())
    }
}
