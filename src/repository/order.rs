use sea_orm::{ColumnTrait, Condition, DbErr};
use uuid::Uuid;

use super::{Query, Repository};
use crate::{
    entity::{
        discount_codes::{self, Entity as DiscountCodes},
        order_details::{self, Entity as OrderDetails},
        orders::{self, Entity as Orders},
    },
    error::{DataError, DataResult},
};

pub type OrderRepository = Repository<Orders>;
pub type OrderDetailRepository = Repository<OrderDetails>;
pub type DiscountCodeRepository = Repository<DiscountCodes>;

impl Repository<Orders> {
    /// Newest first.
    pub fn for_user(&self, user_id: Uuid) -> Query<'_, Orders> {
        self.find(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::CreatedAt)
    }

    pub fn by_status(&self, status: &str) -> Query<'_, Orders> {
        self.find(orders::Column::Status.eq(status))
            .order_by_desc(orders::Column::CreatedAt)
    }
}

impl Repository<OrderDetails> {
    pub fn for_order(&self, order_id: Uuid) -> Query<'_, OrderDetails> {
        self.find(order_details::Column::OrderId.eq(order_id))
    }

    /// Sum of `quantity * unit_price` over the order's lines, in minor units.
    pub async fn order_total(&self, order_id: Uuid) -> DataResult<i64> {
        let lines = self.for_order(order_id).all().await?;
        lines
            .iter()
            .try_fold(0i64, |total, line| {
                i64::from(line.quantity)
                    .checked_mul(line.unit_price)
                    .and_then(|amount| total.checked_add(amount))
            })
            .ok_or_else(|| {
                DataError::OrmError(DbErr::Custom(format!("total of order {order_id} overflows")))
            })
    }
}

impl Repository<DiscountCodes> {
    pub async fn by_code(&self, code: &str) -> DataResult<Option<discount_codes::Model>> {
        self.find(discount_codes::Column::Code.eq(code)).one().await
    }

    /// Codes that are switched on and have not expired at `now`.
    pub fn active(&self, now: chrono::DateTime<chrono::FixedOffset>) -> Query<'_, DiscountCodes> {
        self.find(discount_codes::Column::IsActive.eq(true)).filter(
            Condition::any()
                .add(discount_codes::Column::ExpiresAt.is_null())
                .add(discount_codes::Column::ExpiresAt.gt(now)),
        )
    }
}
