use chrono::Utc;
use ecommerce_data::{
    SessionFactory, UnitOfWork,
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        brands, categories, discount_codes, product_images, product_variants, products, roles,
        user_roles, users,
    },
    repository::{
        BrandRepository, CategoryRepository, DiscountCodeRepository, ProductImageRepository,
        ProductRepository, ProductVariantRepository, RoleRepository, UserRepository,
        UserRoleRepository,
    },
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ecommerce_data=debug".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let factory = SessionFactory::new(orm);
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let outcome = seed(&factory, &uow).await;
    uow.dispose().await;
    outcome?;

    tracing::info!("seed completed");
    Ok(())
}

async fn seed(factory: &Arc<SessionFactory>, uow: &UnitOfWork) -> anyhow::Result<()> {
    let admin_role = ensure_role(factory, "admin").await?;
    let customer_role = ensure_role(factory, "customer").await?;
    let admin = ensure_user(factory, "admin", "admin@example.com", admin_role).await?;
    let customer = ensure_user(factory, "customer", "customer@example.com", customer_role).await?;
    tracing::info!(%admin, %customer, "users ensured");

    let products = ProductRepository::new(factory);
    if products.get_all().count().await? == 0 {
        seed_catalog(factory).await?;
    } else {
        tracing::info!("catalog already present, skipped");
    }

    let codes = DiscountCodeRepository::new(factory);
    if codes.by_code("WELCOME10").await?.is_none() {
        codes
            .add(discount_codes::Model {
                id: Uuid::new_v4(),
                code: "WELCOME10".into(),
                rules: json!({ "percent_off": 10, "min_total": 50000 }),
                is_active: true,
                expires_at: None,
            })
            .await?;
    }

    uow.commit().await?;
    Ok(())
}

async fn ensure_role(factory: &Arc<SessionFactory>, name: &str) -> anyhow::Result<Uuid> {
    let roles = RoleRepository::new(factory);
    if let Some(role) = roles.by_name(name).await? {
        return Ok(role.id);
    }
    let role = roles
        .add(roles::Model {
            id: Uuid::new_v4(),
            name: name.into(),
        })
        .await?;
    Ok(role.id)
}

async fn ensure_user(
    factory: &Arc<SessionFactory>,
    user_name: &str,
    email: &str,
    role_id: Uuid,
) -> anyhow::Result<Uuid> {
    let users = UserRepository::new(factory);
    if let Some(user) = users.by_email(email).await? {
        return Ok(user.id);
    }
    let user = users
        .add(users::Model {
            id: Uuid::new_v4(),
            user_name: user_name.into(),
            email: email.into(),
            full_name: None,
            created_at: Utc::now().into(),
        })
        .await?;
    UserRoleRepository::new(factory)
        .add(user_roles::Model {
            id: Uuid::new_v4(),
            user_id: user.id,
            role_id,
        })
        .await?;
    Ok(user.id)
}

async fn seed_catalog(factory: &Arc<SessionFactory>) -> anyhow::Result<()> {
    let categories = CategoryRepository::new(factory);
    let apparel = categories.add(category("Apparel", None, 0)).await?;
    let hoodies = categories.add(category("Hoodies", Some(apparel.id), 0)).await?;
    let accessories = categories.add(category("Accessories", None, 1)).await?;

    let brand = BrandRepository::new(factory)
        .add(brands::Model {
            id: Uuid::new_v4(),
            name: "Ferris & Co".into(),
        })
        .await?;

    let catalog = [
        ("Axum Hoodie", "Warm hoodie for Rustaceans", 550000, 50, hoodies.id),
        ("Ferris Mug", "Coffee tastes better with Ferris", 120000, 100, accessories.id),
        ("Rust Sticker Pack", "Decorate your laptop", 50000, 200, accessories.id),
    ];

    let products = ProductRepository::new(factory);
    let variants = ProductVariantRepository::new(factory);
    let images = ProductImageRepository::new(factory);
    for (name, description, price, stock, category_id) in catalog {
        let product = products
            .add(products::Model {
                id: Uuid::new_v4(),
                category_id,
                brand_id: Some(brand.id),
                name: name.into(),
                description: Some(description.into()),
                price,
                stock,
                is_active: true,
                created_at: Utc::now().into(),
            })
            .await?;
        images
            .add(product_images::Model {
                id: Uuid::new_v4(),
                product_id: product.id,
                url: format!("https://cdn.example.com/{}.png", product.id),
                is_primary: true,
            })
            .await?;
        for size in ["S", "M", "L"] {
            variants
                .add(product_variants::Model {
                    id: Uuid::new_v4(),
                    product_id: product.id,
                    name: size.into(),
                    sku: format!("{}-{size}", product.id.simple()),
                    price_adjustment: 0,
                    stock: stock / 3,
                })
                .await?;
        }
    }

    tracing::info!(products = catalog.len(), "catalog seeded");
    Ok(())
}

fn category(name: &str, parent: Option<Uuid>, display_order: i32) -> categories::Model {
    categories::Model {
        id: Uuid::new_v4(),
        name: name.into(),
        parent_category_id: parent,
        is_active: true,
        display_order,
    }
}
