#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use ecommerce_data::{
    Record, Repository, SessionFactory, UnitOfWork,
    config::DbConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        brands, cart_items, carts, categories, discount_codes, order_details, orders,
        product_images, product_variants, products, reviews, users, wishlists,
    },
    repository::{CategoryRepository, ProductRepository, UserRepository},
    unit_of_work::scoped,
};
use sea_orm::{DatabaseConnection, IntoActiveModel};
use uuid::Uuid;

/// Fresh in-memory database with the schema applied.
pub async fn setup() -> anyhow::Result<DatabaseConnection> {
    let conn = create_orm_conn(&DbConfig::in_memory()).await?;
    run_migrations(&conn).await?;
    Ok(conn)
}

/// Reads one row through a throwaway session, i.e. what is durable right now.
pub async fn reload<E>(conn: &DatabaseConnection, id: E::Key) -> anyhow::Result<Option<E::Model>>
where
    E: Record,
    E::Model: IntoActiveModel<E::Active> + PartialEq + Sync + 'static,
{
    let factory = SessionFactory::new(conn.clone());
    let found = Repository::<E>::new(&factory).get_by_id(id).await;
    factory.dispose().await;
    Ok(found?)
}

pub struct Catalog {
    pub user: users::Model,
    pub category: categories::Model,
    pub products: Vec<products::Model>,
}

/// Commits one user, one category and two products in it.
pub async fn seed_catalog(conn: &DatabaseConnection) -> anyhow::Result<Catalog> {
    scoped(conn, |factory| async move {
        let user = UserRepository::new(&factory).add(user("alice")).await?;
        let category = CategoryRepository::new(&factory)
            .add(category("Mugs", None))
            .await?;
        let repo = ProductRepository::new(&factory);
        let mug = repo.add(product(category.id, "Ferris Mug", 1200, 10)).await?;
        let cup = repo.add(product(category.id, "Crab Cup", 900, 3)).await?;
        UnitOfWork::new(Arc::clone(&factory)).commit().await?;
        Ok::<_, anyhow::Error>(Catalog {
            user,
            category,
            products: vec![mug, cup],
        })
    })
    .await
}

pub fn user(name: &str) -> users::Model {
    users::Model {
        id: Uuid::new_v4(),
        user_name: name.into(),
        email: format!("{name}@example.com"),
        full_name: None,
        created_at: Utc::now().into(),
    }
}

pub fn category(name: &str, parent: Option<Uuid>) -> categories::Model {
    categories::Model {
        id: Uuid::new_v4(),
        name: name.into(),
        parent_category_id: parent,
        is_active: true,
        display_order: 0,
    }
}

pub fn product(category_id: Uuid, name: &str, price: i64, stock: i32) -> products::Model {
    products::Model {
        id: Uuid::new_v4(),
        category_id,
        brand_id: None,
        name: name.into(),
        description: None,
        price,
        stock,
        is_active: true,
        created_at: Utc::now().into(),
    }
}

pub fn variant(product_id: Uuid, name: &str) -> product_variants::Model {
    product_variants::Model {
        id: Uuid::new_v4(),
        product_id,
        name: name.into(),
        sku: format!("{}-{name}", product_id.simple()),
        price_adjustment: 0,
        stock: 5,
    }
}

pub fn image(product_id: Uuid, is_primary: bool) -> product_images::Model {
    product_images::Model {
        id: Uuid::new_v4(),
        product_id,
        url: format!("https://cdn.example.com/{}.png", Uuid::new_v4()),
        is_primary,
    }
}

/// `hours_ago` keeps creation order deterministic between orders.
pub fn order(user_id: Uuid, hours_ago: i64) -> orders::Model {
    orders::Model {
        id: Uuid::new_v4(),
        user_id,
        discount_code_id: None,
        status: "pending".into(),
        total_amount: 0,
        created_at: (Utc::now() - Duration::hours(hours_ago)).into(),
    }
}

pub fn order_detail(order_id: Uuid, product_id: Uuid, quantity: i32, unit_price: i64) -> order_details::Model {
    order_details::Model {
        order_id,
        product_id,
        product_variant_id: None,
        quantity,
        unit_price,
    }
}

pub fn cart(user_id: Uuid) -> carts::Model {
    carts::Model {
        id: Uuid::new_v4(),
        user_id,
        created_at: Utc::now().into(),
    }
}

pub fn cart_item(cart_id: Uuid, product_id: Uuid, quantity: i32) -> cart_items::Model {
    cart_items::Model {
        id: Uuid::new_v4(),
        cart_id,
        product_id,
        product_variant_id: None,
        quantity,
    }
}

pub fn review(user_id: Uuid, product_id: Uuid, rating: i32) -> reviews::Model {
    reviews::Model {
        id: Uuid::new_v4(),
        user_id,
        product_id,
        rating,
        comment: None,
        created_at: Utc::now().into(),
    }
}

pub fn wishlist(user_id: Uuid, product_id: Uuid) -> wishlists::Model {
    wishlists::Model {
        id: Uuid::new_v4(),
        user_id,
        product_id,
        created_at: Utc::now().into(),
    }
}

pub fn brand(name: &str) -> brands::Model {
    brands::Model {
        id: Uuid::new_v4(),
        name: name.into(),
    }
}

pub fn discount_code(code: &str) -> discount_codes::Model {
    discount_codes::Model {
        id: Uuid::new_v4(),
        code: code.into(),
        rules: serde_json::json!({ "percent_off": 10 }),
        is_active: true,
        expires_at: None,
    }
}
