//! Counter entity: a client-named, non-negative count starting at zero.

use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const NAME_MAX_LEN: usize = 255;
const FORBIDDEN: [char; 4] = [':', '*', '?', '/'];

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "counters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(StringLen::N(255))")]
    pub name: String,
    #[serde(rename = "counter")]
    pub count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Counter {} count=[{}]>", self.name, self.count)
    }
}

/// Counter names become store keys, so glob and separator characters are refused.
pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("Invalid counter: name must not be empty".into()));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(ModelError::Validation(format!(
            "Invalid counter: name longer than {NAME_MAX_LEN} characters"
        )));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN.contains(c) || c.is_control()) {
        return Err(ModelError::Validation(format!("Invalid counter: name contains {c:?}")));
    }
    Ok(())
}

impl Model {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), count: 0 }
    }

    pub fn to_store_text(&self) -> String {
        self.count.to_string()
    }

    /// Key-value stores hand back decimal text; anything else is corruption.
    pub fn from_store_text(name: &str, text: &str) -> Result<Self, ModelError> {
        let count = text
            .trim()
            .parse::<i64>()
            .map_err(|_| ModelError::Corrupt(format!("counter {name} holds {text:?}, not an integer")))?;
        if count < 0 {
            return Err(ModelError::Corrupt(format!("counter {name} is negative ({count})")));
        }
        Ok(Self { name: name.to_string(), count })
    }
}
