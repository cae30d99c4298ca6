use sea_orm::ColumnTrait;
use uuid::Uuid;

use super::{Query, Repository};
use crate::{
    entity::{
        cart_items::{self, Entity as CartItems},
        carts::{self, Entity as Carts},
    },
    error::DataResult,
};

pub type CartRepository = Repository<Carts>;
pub type CartItemRepository = Repository<CartItems>;

impl Repository<Carts> {
    /// A user has at most one open cart; the oldest one wins if several exist.
    pub async fn for_user(&self, user_id: Uuid) -> DataResult<Option<carts::Model>> {
        self.find(carts::Column::UserId.eq(user_id))
            .order_by_asc(carts::Column::CreatedAt)
            .one()
            .await
    }
}

impl Repository<CartItems> {
    pub fn for_cart(&self, cart_id: Uuid) -> Query<'_, CartItems> {
        self.find(cart_items::Column::CartId.eq(cart_id))
    }
}
