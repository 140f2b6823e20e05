//! Person, Category and Team data structures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identifier of a player (e.g. a handle or a name typed by the operator).
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
}

impl Person {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A category code that does not map to any known team category.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum CategoryError {
    #[error("Team category {0} not recognized")]
    Unknown(u8),
}

/// Team category. Travels on the wire as its integer code.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Category {
    Male,
    Female,
    Mixed,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Male, Category::Female, Category::Mixed];

    /// Human readable label, e.g. for "Mixed team".
    pub fn label(self) -> &'static str {
        match self {
            Category::Male => "Male",
            Category::Female => "Female",
            Category::Mixed => "Mixed",
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Category::Male => 0,
            Category::Female => 1,
            Category::Mixed => 2,
        }
    }
}

impl TryFrom<u8> for Category {
    type Error = CategoryError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Category::Male),
            1 => Ok(Category::Female),
            2 => Ok(Category::Mixed),
            other => Err(CategoryError::Unknown(other)),
        }
    }
}

impl From<Category> for u8 {
    fn from(category: Category) -> Self {
        category.code()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Two players entered together, plus the category they compete in.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "person1")]
    pub member_a: Person,
    #[serde(rename = "person2")]
    pub member_b: Person,
    #[serde(rename = "gender")]
    pub category: Category,
}

impl Team {
    pub fn new(member_a: Person, member_b: Person, category: Category) -> Self {
        Self {
            member_a,
            member_b,
            category,
        }
    }

    /// "alice, bob" as shown in roster listings.
    pub fn members_label(&self) -> String {
        format!("{}, {}", self.member_a.id, self.member_b.id)
    }
}
