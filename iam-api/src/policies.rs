use iam_lib::ids;
use iam_lib::sec::authz::Rule;
use iam_lib::validation;
use serde::{Serialize, Deserialize};

use crate::{Validator, ApiError, Detail};
use crate::error::GeneralKind;

#[derive(Debug, Serialize, Deserialize)]
pub struct ListItem {
    pub pid: ids::PolicyUid,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Policy {
    pub pid: ids::PolicyUid,
    pub name: Option<String>,
    pub hostname: String,
    pub rules: Vec<Rule>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub hostname: String,

    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Validator for CreatePolicy {
    fn validate(&self) -> Result<(), ApiError> {
        let mut invalid = Vec::new();

        if let Some(name) = &self.name {
            if !validation::alias_valid(name) {
                invalid.push("name");
            }
        }

        if !validation::hostname_valid(&self.hostname) {
            invalid.push("hostname");
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

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatePolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,
}

impl Validator for UpdatePolicy {
    fn validate(&self) -> Result<(), ApiError> {
        let mut invalid = Vec::new();

        if let Some(name) = &self.name {
            if !validation::alias_valid(name) {
                invalid.push("name");
            }
        }

        if let Some(hostname) = &self.hostname {
            if !validation::hostname_valid(hostname) {
                invalid.push("hostname");
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

    fn has_work(&self) -> bool {
        self.name.is_some() || self.hostname.is_some() || self.rules.is_some()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use iam_lib::sec::authz::{Action, Effect};

    #[test]
    pub fn create_policy_rejects_blank_hostname() {
        let payload = CreatePolicy {
            name: None,
            hostname: String::new(),
            rules: Vec::new(),
        };

        assert!(payload.validate().is_err());
    }

    #[test]
    pub fn rule_wire_shape() {
        let rule = Rule {
            effect: Effect::Allow,
            action: Action::Read,
            resource: String::from("/users/*"),
        };

        let json = serde_json::to_value(&rule).unwrap();

        assert_eq!(json["effect"], "Allow");
        assert_eq!(json["action"], "Read");
        assert_eq!(json["resource"], "/users/*");
    }

    #[test]
    pub fn update_policy_no_work() {
        let payload = UpdatePolicy {
            name: None,
            hostname: None,
            rules: None,
        };

        assert!(!payload.has_work());
    }
}
