//! Pet entity.
//!
//! A pet is identified by a store-assigned integer id. Client input arrives
//! as JSON and goes through [`NewPet::from_json`]; the id is never taken from
//! client input.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;

pub const NAME_MAX_LEN: usize = 63;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Gender {
    #[sea_orm(string_value = "Male")]
    Male,
    #[sea_orm(string_value = "Female")]
    Female,
    #[sea_orm(string_value = "Unknown")]
    Unknown,
}

impl Gender {
    pub const NAMES: [&'static str; 3] = ["Male", "Female", "Unknown"];

    pub fn name(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unknown => "Unknown",
        }
    }
}

impl Default for Gender {
    fn default() -> Self { Gender::Unknown }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Exact, case-sensitive variant names only.
impl FromStr for Gender {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Unknown" => Ok(Gender::Unknown),
            other => Err(ModelError::Validation(format!(
                "Invalid attribute: gender {other:?} is not one of {:?}",
                Gender::NAMES
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(63))")]
    pub name: String,
    #[sea_orm(column_type = "String(StringLen::N(63))")]
    pub category: String,
    pub available: bool,
    pub gender: Gender,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Pet {:?} id=[{}]>", self.name, self.id)
    }
}

/// A validated pet without identity; what create and update accept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPet {
    pub name: String,
    pub category: String,
    pub available: bool,
    pub gender: Gender,
}

fn bad_body() -> ModelError {
    ModelError::Validation("Invalid pet: body of request contained bad or no data".into())
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn required_text(obj: &Map<String, Value>, field: &str) -> Result<String, ModelError> {
    let value = obj.get(field).ok_or_else(|| ModelError::missing("pet", field))?;
    let Value::String(s) = value else {
        return Err(ModelError::Validation(format!(
            "Invalid type for string [{field}]: {}",
            json_type(value)
        )));
    };
    validate_text(field, s)?;
    Ok(s.clone())
}

pub fn validate_text(field: &str, s: &str) -> Result<(), ModelError> {
    if s.trim().is_empty() {
        return Err(ModelError::Validation(format!("Invalid pet: {field} must not be empty")));
    }
    if s.chars().count() > NAME_MAX_LEN {
        return Err(ModelError::Validation(format!(
            "Invalid pet: {field} longer than {NAME_MAX_LEN} characters"
        )));
    }
    Ok(())
}

impl NewPet {
    /// Validate a raw JSON body. Fields are checked in order and the first
    /// bad one is reported; nothing is coerced. Any `id` is ignored.
    pub fn from_json(raw: &Value) -> Result<Self, ModelError> {
        let obj = raw.as_object().ok_or_else(bad_body)?;
        let name = required_text(obj, "name")?;
        let category = required_text(obj, "category")?;
        let available = match obj.get("available") {
            None => return Err(ModelError::missing("pet", "available")),
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(ModelError::Validation(format!(
                    "Invalid type for boolean [available]: {}",
                    json_type(other)
                )))
            }
        };
        // absent gender takes the column default
        let gender = match obj.get("gender") {
            None | Some(Value::Null) => Gender::Unknown,
            Some(Value::String(s)) => s.parse()?,
            Some(other) => {
                return Err(ModelError::Validation(format!(
                    "Invalid type for enum [gender]: {}",
                    json_type(other)
                )))
            }
        };
        Ok(Self { name, category, available, gender })
    }

    pub fn with_id(self, id: i32) -> Model {
        Model {
            id,
            name: self.name,
            category: self.category,
            available: self.available,
            gender: self.gender,
        }
    }
}

impl Model {
    /// Hash-like text form for key-value stores: every value is a string.
    pub fn to_store_text(&self) -> String {
        serde_json::json!({
            "id": self.id.to_string(),
            "name": self.name,
            "category": self.category,
            "available": self.available.to_string(),
            "gender": self.gender.name(),
        })
        .to_string()
    }

    /// Decode and revalidate the text form written by [`Model::to_store_text`].
    pub fn from_store_text(text: &str) -> Result<Self, ModelError> {
        let fields: HashMap<String, String> =
            serde_json::from_str(text).map_err(|e| ModelError::Corrupt(format!("pet record: {e}")))?;
        let field = |name: &str| {
            fields
                .get(name)
                .map(String::as_str)
                .ok_or_else(|| ModelError::Corrupt(format!("pet record missing [{name}]")))
        };
        let id = field("id")?
            .parse::<i32>()
            .map_err(|_| ModelError::Corrupt("pet record [id] is not an integer".into()))?;
        let available = match field("available")? {
            "true" => true,
            "false" => false,
            other => return Err(ModelError::Corrupt(format!("pet record [available] is {other:?}"))),
        };
        let gender = field("gender")?
            .parse::<Gender>()
            .map_err(|e| ModelError::Corrupt(format!("pet record [gender]: {e}")))?;
        let name = field("name")?.to_string();
        let category = field("category")?.to_string();
        for (f, v) in [("name", &name), ("category", &category)] {
            validate_text(f, v).map_err(|e| ModelError::Corrupt(e.to_string()))?;
        }
        Ok(Self { id, name, category, available, gender })
    }
}

impl Model {
    /// Revalidate a row read back from a relational store.
    pub fn checked(self) -> Result<Self, ModelError> {
        for (f, v) in [("name", &self.name), ("category", &self.category)] {
            validate_text(f, v).map_err(|e| ModelError::Corrupt(format!("pet {}: {e}", self.id)))?;
        }
        Ok(self)
    }
}

/// Attribute predicate for pet queries; unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PetFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    pub available: Option<bool>,
    pub gender: Option<Gender>,
}

impl PetFilter {
    /// Build from query-string values; booleans must be `true`/`false` and
    /// genders an exact variant name.
    pub fn parse(
        name: Option<String>,
        category: Option<String>,
        available: Option<&str>,
        gender: Option<&str>,
    ) -> Result<Self, ModelError> {
        let available = match available {
            None => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(other) => {
                return Err(ModelError::Validation(format!(
                    "Invalid query: available must be true or false, got {other:?}"
                )))
            }
        };
        let gender = gender.map(str::parse::<Gender>).transpose()?;
        Ok(Self { name, category, available, gender })
    }

    pub fn is_empty(&self) -> bool {
        self == &PetFilter::default()
    }

    pub fn matches(&self, pet: &Model) -> bool {
        self.name.as_ref().map_or(true, |n| &pet.name == n)
            && self.category.as_ref().map_or(true, |c| &pet.category == c)
            && self.available.map_or(true, |a| pet.available == a)
            && self.gender.map_or(true, |g| pet.gender == g)
    }
}
