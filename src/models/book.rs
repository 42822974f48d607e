use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    /// Copies the library owns
    pub total_copies: i32,
    /// Copies on the shelf; always between 0 and `total_copies`
    pub available_copies: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for domain::Book {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            author: model.author,
            isbn: model.isbn,
            total_copies: model.total_copies,
            available_copies: model.available_copies,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
