use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::{Query, Repository};
use crate::{
    entity::{
        brands::{self, Entity as Brands},
        product_images::{self, Entity as ProductImages},
        product_variant_images::{self, Entity as ProductVariantImages},
        product_variants::{self, Entity as ProductVariants},
        products::{Column, Entity as Products},
    },
    error::DataResult,
};

pub type ProductRepository = Repository<Products>;
pub type ProductVariantRepository = Repository<ProductVariants>;
pub type ProductImageRepository = Repository<ProductImages>;
pub type ProductVariantImageRepository = Repository<ProductVariantImages>;
pub type BrandRepository = Repository<Brands>;

impl Repository<Products> {
    pub fn by_category(&self, category_id: Uuid) -> Query<'_, Products> {
        self.query(
            Products::find()
                .filter(Column::CategoryId.eq(category_id))
                .order_by_asc(Column::Name),
        )
    }

    pub fn by_brand(&self, brand_id: Uuid) -> Query<'_, Products> {
        self.query(
            Products::find()
                .filter(Column::BrandId.eq(brand_id))
                .order_by_asc(Column::Name),
        )
    }

    /// Products on sale, newest first.
    pub fn active(&self) -> Query<'_, Products> {
        self.query(
            Products::find()
                .filter(Column::IsActive.eq(true))
                .order_by_desc(Column::CreatedAt),
        )
    }

    /// Name or description contains `term`.
    pub fn search(&self, term: &str) -> Query<'_, Products> {
        self.query(
            Products::find()
                .filter(
                    sea_orm::Condition::any()
                        .add(Column::Name.contains(term))
                        .add(Column::Description.contains(term)),
                )
                .order_by_asc(Column::Name),
        )
    }

    pub fn low_stock(&self, threshold: i32) -> Query<'_, Products> {
        self.query(
            Products::find()
                .filter(Column::Stock.lt(threshold))
                .order_by_asc(Column::Stock),
        )
    }
}

impl Repository<ProductVariants> {
    pub fn for_product(&self, product_id: Uuid) -> Query<'_, ProductVariants> {
        self.query(
            ProductVariants::find()
                .filter(product_variants::Column::ProductId.eq(product_id))
                .order_by_asc(product_variants::Column::Name),
        )
    }
}

impl Repository<ProductImages> {
    pub fn for_product(&self, product_id: Uuid) -> Query<'_, ProductImages> {
        self.find(product_images::Column::ProductId.eq(product_id))
    }

    pub async fn primary_for(&self, product_id: Uuid) -> DataResult<Option<product_images::Model>> {
        self.find(product_images::Column::ProductId.eq(product_id))
            .filter(product_images::Column::IsPrimary.eq(true))
            .one()
            .await
    }
}

impl Repository<ProductVariantImages> {
    pub fn for_variant(&self, variant_id: Uuid) -> Query<'_, ProductVariantImages> {
        self.find(product_variant_images::Column::ProductVariantId.eq(variant_id))
    }
}

impl Repository<Brands> {
    pub async fn by_name(&self, name: &str) -> DataResult<Option<brands::Model>> {
        self.find(brands::Column::Name.eq(name)).one().await
    }
}
