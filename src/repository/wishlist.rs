use sea_orm::ColumnTrait;
use uuid::Uuid;

use super::{Query, Repository};
use crate::{
    entity::wishlists::{Column, Entity as Wishlists},
    error::DataResult,
};

pub type WishlistRepository = Repository<Wishlists>;

impl Repository<Wishlists> {
    pub fn for_user(&self, user_id: Uuid) -> Query<'_, Wishlists> {
        self.find(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
    }

    pub async fn contains(&self, user_id: Uuid, product_id: Uuid) -> DataResult<bool> {
        let matches = self
            .find(Column::UserId.eq(user_id))
            .filter(Column::ProductId.eq(product_id))
            .count()
            .await?;
        Ok(matches > 0)
    }
}
