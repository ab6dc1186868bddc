use std::borrow::Cow;

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::catalog::CatalogEntry;

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Not a valid choice.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Field-level messages shown next to the offending inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field: field.to_string(),
            message: message.into(),
        }])
    }

    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |err| err.field == field)
            .map(|err| err.message.as_str())
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| FieldError {
                    field: field.to_string(),
                    message: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        Self(fields)
    }
}

fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::Borrowed(REQUIRED));
        return Err(err);
    }
    Ok(())
}

fn valid_choice(value: &str) -> Result<(), ValidationError> {
    if value.trim().parse::<i32>().is_err() {
        let mut err = ValidationError::new("choice");
        err.message = Some(Cow::Borrowed(INVALID_CHOICE));
        return Err(err);
    }
    Ok(())
}

/// Add/edit payload shared by departments and roles.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct EntryForm {
    #[serde(default)]
    #[validate(
        custom(function = "required"),
        length(max = 60, message = "Name must be at most 60 characters.")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "Description must be at most 200 characters."))]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogInput {
    pub name: String,
    pub description: Option<String>,
}

impl EntryForm {
    pub fn normalized(self) -> Self {
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Self {
            name: self.name.trim().to_string(),
            description,
        }
    }

    pub fn parse(self) -> Result<CatalogInput, FormErrors> {
        let form = self.normalized();
        form.validate()?;
        Ok(CatalogInput {
            name: form.name,
            description: form.description,
        })
    }
}

impl From<&CatalogEntry> for EntryForm {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            name: entry.name.clone(),
            description: entry.description.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct AssignForm {
    #[serde(default)]
    #[validate(custom(function = "valid_choice"))]
    pub department: String,
    #[serde(default)]
    #[validate(custom(function = "valid_choice"))]
    pub role: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub department_id: i32,
    pub role_id: i32,
}

impl AssignForm {
    pub fn current(department_id: Option<i32>, role_id: Option<i32>) -> Self {
        Self {
            department: department_id.map(|id| id.to_string()).unwrap_or_default(),
            role: role_id.map(|id| id.to_string()).unwrap_or_default(),
        }
    }

    pub fn parse(&self) -> Result<Assignment, FormErrors> {
        self.validate()?;
        let department_id = self
            .department
            .trim()
            .parse()
            .map_err(|_| FormErrors::single("department", INVALID_CHOICE))?;
        let role_id = self
            .role
            .trim()
            .parse()
            .map_err(|_| FormErrors::single("role", INVALID_CHOICE))?;
        Ok(Assignment {
            department_id,
            role_id,
        })
    }
}

pub fn invalid_choice(field: &str) -> FormErrors {
    FormErrors::single(field, INVALID_CHOICE)
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(custom(function = "required"))]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "required"))]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        let errors = EntryForm {
            name: "   ".into(),
            description: None,
        }
        .parse()
        .unwrap_err();
        assert_eq!(errors.for_field("name").collect::<Vec<_>>(), vec![REQUIRED]);
    }

    #[test]
    fn blank_description_becomes_none() {
        let input = EntryForm {
            name: "  IT ".into(),
            description: Some("  ".into()),
        }
        .parse()
        .unwrap();
        assert_eq!(
            input,
            CatalogInput {
                name: "IT".into(),
                description: None,
            }
        );
    }

    #[test]
    fn overlong_name_is_rejected() {
        let errors = EntryForm {
            name: "x".repeat(61),
            description: None,
        }
        .parse()
        .unwrap_err();
        assert_eq!(errors.for_field("name").count(), 1);
        assert!(errors.for_field("description").next().is_none());
    }

    #[test]
    fn assignment_requires_both_choices() {
        let errors = AssignForm {
            department: "3".into(),
            role: String::new(),
        }
        .parse()
        .unwrap_err();
        assert_eq!(
            errors.for_field("role").collect::<Vec<_>>(),
            vec![INVALID_CHOICE]
        );
        assert!(errors.for_field("department").next().is_none());

        let ok = AssignForm {
            department: "3".into(),
            role: " 9".into(),
        }
        .parse()
        .unwrap();
        assert_eq!(
            ok,
            Assignment {
                department_id: 3,
                role_id: 9,
            }
        );
    }
}
