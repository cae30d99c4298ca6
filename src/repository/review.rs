use sea_orm::ColumnTrait;
use uuid::Uuid;

use super::{Query, Repository};
use crate::{
    entity::reviews::{Column, Entity as Reviews},
    error::DataResult,
};

pub type ReviewRepository = Repository<Reviews>;

impl Repository<Reviews> {
    pub fn for_product(&self, product_id: Uuid) -> Query<'_, Reviews> {
        self.find(Column::ProductId.eq(product_id))
            .order_by_desc(Column::CreatedAt)
    }

    pub fn by_user(&self, user_id: Uuid) -> Query<'_, Reviews> {
        self.find(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
    }

    /// Mean rating of a product, `None` when it has no reviews.
    pub async fn average_rating(&self, product_id: Uuid) -> DataResult<Option<f64>> {
        let reviews = self.find(Column::ProductId.eq(product_id)).all().await?;
        if reviews.is_empty() {
            return Ok(None);
        }
        let total: i64 = reviews.iter().map(|review| i64::from(review.rating)).sum();
        Ok(Some(total as f64 / reviews.len() as f64))
    }
}
