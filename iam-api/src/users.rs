use iam_lib::ids;
use iam_lib::sec::authn;
use iam_lib::validation;
use serde::{Serialize, Deserialize};

use crate::{Validator, ApiError, Detail};
use crate::error::GeneralKind;

/// wire form of a registered key, base64 of the raw 32 bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKey {
    pub key: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListItem {
    pub uid: ids::UserUid,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    pub uid: ids::UserUid,
    pub email: Option<String>,
    pub groups: Vec<ids::GroupUid>,
    pub policies: Vec<ids::PolicyUid>,
    pub public_keys: Vec<PublicKey>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub public_keys: Vec<PublicKey>,
}

impl Validator for CreateUser {
    fn validate(&self) -> Result<(), ApiError> {
        let mut invalid = Vec::new();

        if let Some(email) = &self.email {
            if !validation::email_valid(email) {
                invalid.push("email");
            }
        }

        for public_key in &self.public_keys {
            if authn::PublicKey::from_base64(&public_key.key).is_err() {
                invalid.push("public_keys.key");
            }

            if !validation::description_valid(&public_key.description) {
                invalid.push("public_keys.description");
            }
        }

        if !invalid.is_empty() {
            Err(ApiError::from((
                GeneralKind::ValidationFailed,
                Detail::mult_keys(invalid)
            )))
        } else {
            Ok(())
        }
    }
}
