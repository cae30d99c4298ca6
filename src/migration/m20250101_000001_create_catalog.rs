use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entity::{
    brands, cart_items, carts, categories, discount_codes, order_details, orders, product_images,
    product_variant_images, product_variants, products, reviews, roles, user_roles, users,
    wishlists,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    // Tables are created parent-first so every foreign key target exists.
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        create(manager, &schema, users::Entity).await?;
        create(manager, &schema, roles::Entity).await?;
        create(manager, &schema, user_roles::Entity).await?;
        create(manager, &schema, categories::Entity).await?;
        create(manager, &schema, brands::Entity).await?;
        create(manager, &schema, discount_codes::Entity).await?;
        create(manager, &schema, products::Entity).await?;
        create(manager, &schema, product_variants::Entity).await?;
        create(manager, &schema, product_images::Entity).await?;
        create(manager, &schema, product_variant_images::Entity).await?;
        create(manager, &schema, orders::Entity).await?;
        create(manager, &schema, order_details::Entity).await?;
        create(manager, &schema, carts::Entity).await?;
        create(manager, &schema, cart_items::Entity).await?;
        create(manager, &schema, reviews::Entity).await?;
        create(manager, &schema, wishlists::Entity).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_entity(manager, wishlists::Entity).await?;
        drop_entity(manager, reviews::Entity).await?;
        drop_entity(manager, cart_items::Entity).await?;
        drop_entity(manager, carts::Entity).await?;
        drop_entity(manager, order_details::Entity).await?;
        drop_entity(manager, orders::Entity).await?;
        drop_entity(manager, product_variant_images::Entity).await?;
        drop_entity(manager, product_images::Entity).await?;
        drop_entity(manager, product_variants::Entity).await?;
        drop_entity(manager, products::Entity).await?;
        drop_entity(manager, discount_codes::Entity).await?;
        drop_entity(manager, brands::Entity).await?;
        drop_entity(manager, categories::Entity).await?;
        drop_entity(manager, user_roles::Entity).await?;
        drop_entity(manager, roles::Entity).await?;
        drop_entity(manager, users::Entity).await?;

        Ok(())
    }
}

async fn create<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
        .await
}

async fn drop_entity<E: EntityTrait>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr> {
    manager
        .drop_table(Table::drop().table(entity).if_exists().to_owned())
        .await
}
