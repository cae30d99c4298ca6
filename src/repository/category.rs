use std::collections::HashSet;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::{Query, Repository};
use crate::{
    entity::categories::{Column, Entity as Categories, Model as Category},
    error::DataResult,
};

pub type CategoryRepository = Repository<Categories>;

impl Repository<Categories> {
    /// Top-level categories, in display order.
    pub fn roots(&self) -> Query<'_, Categories> {
        self.query(
            Categories::find()
                .filter(Column::ParentCategoryId.is_null())
                .order_by_asc(Column::DisplayOrder),
        )
    }

    pub fn active(&self) -> Query<'_, Categories> {
        self.query(
            Categories::find()
                .filter(Column::IsActive.eq(true))
                .order_by_asc(Column::DisplayOrder),
        )
    }

    pub fn sub_categories(&self, parent: Uuid) -> Query<'_, Categories> {
        self.query(
            Categories::find()
                .filter(Column::ParentCategoryId.eq(parent))
                .order_by_asc(Column::DisplayOrder),
        )
    }

    /// Parent, grandparent and so on up to the root, nearest first.
    pub async fn ancestors(&self, id: Uuid) -> DataResult<Vec<Category>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut cursor = match self.get_by_id(id).await? {
            Some(category) => category.parent_category_id,
            None => return Ok(chain),
        };
        while let Some(parent_id) = cursor {
            if !seen.insert(parent_id) {
                break;
            }
            let Some(parent) = self.get_by_id(parent_id).await? else {
                break;
            };
            cursor = parent.parent_category_id;
            chain.push(parent);
        }
        Ok(chain)
    }

    pub async fn reparent(
        &self,
        category: Category,
        new_parent: Option<Uuid>,
    ) -> DataResult<Category> {
        tracing::debug!(category = %category.id, parent = ?new_parent, "reparenting category");
        self.update(Category {
            parent_category_id: new_parent,
            ..category
        })
        .await
    }
}
