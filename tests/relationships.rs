mod common;

use std::sync::Arc;

use ecommerce_data::{
    DataError, SessionFactory, UnitOfWork,
    entity::{
        Brands, CartItems, Carts, Categories, DiscountCodes, OrderDetails, Orders, ProductImages,
        ProductVariantImages, ProductVariants, Products, Reviews, UserRoles, Users, Wishlists,
        orders, product_variant_images, products, roles, user_roles,
    },
    repository::{
        BrandRepository, CartItemRepository, CartRepository, CategoryRepository,
        DiscountCodeRepository, OrderDetailRepository, OrderRepository, ProductImageRepository,
        ProductRepository, ProductVariantImageRepository, ProductVariantRepository,
        ReviewRepository, RoleRepository, UserRepository, UserRoleRepository, WishlistRepository,
    },
};
use uuid::Uuid;

use common::{
    brand, cart, cart_item, category, discount_code, image, order, order_detail, product, reload,
    review, seed_catalog, setup, user, variant, wishlist,
};

#[tokio::test]
async fn restrict_blocks_deleting_a_referenced_parent() -> anyhow::Result<()> {
    let conn = setup().await?;
    let catalog = seed_catalog(&conn).await?;

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let categories = CategoryRepository::new(&factory);
    let mugs = categories
        .get_by_id(catalog.category.id)
        .await?
        .expect("seeded category");
    let err = categories.delete(&mugs).await.unwrap_err();
    assert!(matches!(err, DataError::ConstraintViolation(_)), "{err:?}");

    let err = uow.commit().await.unwrap_err();
    assert!(matches!(err, DataError::ConstraintViolation(_)), "{err:?}");
    uow.dispose().await;

    assert!(reload::<Categories>(&conn, catalog.category.id).await?.is_some());
    for product in &catalog.products {
        assert!(reload::<Products>(&conn, product.id).await?.is_some());
    }
    Ok(())
}

#[tokio::test]
async fn deleting_a_product_cascades_to_variants_and_images() -> anyhow::Result<()> {
    let conn = setup().await?;
    let catalog = seed_catalog(&conn).await?;
    let mug = catalog.products[0].clone();
    let other = catalog.products[1].clone();

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let variants = ProductVariantRepository::new(&factory);
    let small = variants.add(variant(mug.id, "small")).await?;
    let large = variants.add(variant(mug.id, "large")).await?;
    let kept = variants.add(variant(other.id, "only")).await?;
    let photo = ProductImageRepository::new(&factory)
        .add(image(mug.id, true))
        .await?;
    let swatch = ProductVariantImageRepository::new(&factory)
        .add(product_variant_images::Model {
            id: Uuid::new_v4(),
            product_variant_id: small.id,
            url: "https://cdn.example.com/swatch.png".into(),
        })
        .await?;
    uow.commit().await?;
    uow.dispose().await;

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let products = ProductRepository::new(&factory);
    let tracked = products.get_by_id(mug.id).await?.expect("seeded product");
    products.delete(&tracked).await?;
    uow.commit().await?;
    uow.dispose().await;

    assert!(reload::<Products>(&conn, mug.id).await?.is_none());
    assert!(reload::<ProductVariants>(&conn, small.id).await?.is_none());
    assert!(reload::<ProductVariants>(&conn, large.id).await?.is_none());
    assert!(reload::<ProductImages>(&conn, photo.id).await?.is_none());
    assert!(reload::<ProductVariantImages>(&conn, swatch.id).await?.is_none());
    assert!(reload::<ProductVariants>(&conn, kept.id).await?.is_some());
    assert!(reload::<Products>(&conn, other.id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn order_detail_identity_is_the_order_product_pair() -> anyhow::Result<()> {
    let conn = setup().await?;
    let catalog = seed_catalog(&conn).await?;
    let mug = catalog.products[0].clone();

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let placed = OrderRepository::new(&factory)
        .add(order(catalog.user.id, 0))
        .await?;
    let details = OrderDetailRepository::new(&factory);
    details.add(order_detail(placed.id, mug.id, 1, 1200)).await?;
    let err = details
        .add(order_detail(placed.id, mug.id, 3, 1100))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::ConstraintViolation(_)), "{err:?}");

    let err = uow.commit().await.unwrap_err();
    assert!(matches!(err, DataError::ConstraintViolation(_)), "{err:?}");
    uow.dispose().await;

    assert!(reload::<Orders>(&conn, placed.id).await?.is_none());
    assert!(reload::<OrderDetails>(&conn, (placed.id, mug.id)).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn one_bad_write_rolls_back_the_whole_unit_of_work() -> anyhow::Result<()> {
    let conn = setup().await?;

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let categories = CategoryRepository::new(&factory);
    let valid = categories.add(category("Lamps", None)).await?;
    let err = ProductRepository::new(&factory)
        .add(product(Uuid::new_v4(), "Nowhere Lamp", 4000, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::ConstraintViolation(_)), "{err:?}");

    assert!(uow.commit().await.is_err());
    uow.dispose().await;

    assert!(reload::<Categories>(&conn, valid.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn a_category_cannot_be_its_own_parent() -> anyhow::Result<()> {
    let conn = setup().await?;

    let factory = SessionFactory::new(conn.clone());
    let mut selfish = category("Loop", None);
    selfish.parent_category_id = Some(selfish.id);
    let err = CategoryRepository::new(&factory)
        .add(selfish.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::ConstraintViolation(_)), "{err:?}");
    factory.dispose().await;

    assert!(reload::<Categories>(&conn, selfish.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn reparenting_under_a_descendant_is_rejected() -> anyhow::Result<()> {
    let conn = setup().await?;

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let categories = CategoryRepository::new(&factory);
    let home = categories.add(category("Home", None)).await?;
    let kitchen = categories.add(category("Kitchen", Some(home.id))).await?;
    let knives = categories.add(category("Knives", Some(kitchen.id))).await?;
    uow.commit().await?;
    uow.dispose().await;

    let factory = SessionFactory::new(conn.clone());
    let categories = CategoryRepository::new(&factory);
    let home = categories.get_by_id(home.id).await?.expect("home");
    let err = categories
        .reparent(home.clone(), Some(knives.id))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::ConstraintViolation(_)), "{err:?}");
    factory.dispose().await;

    // A legal move still goes through.
    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let categories = CategoryRepository::new(&factory);
    let knives = categories.get_by_id(knives.id).await?.expect("knives");
    categories.reparent(knives.clone(), Some(home.id)).await?;
    uow.commit().await?;
    uow.dispose().await;

    let moved = reload::<Categories>(&conn, knives.id).await?.expect("knives");
    assert_eq!(moved.parent_category_id, Some(home.id));
    let untouched = reload::<Categories>(&conn, home.id).await?.expect("home");
    assert_eq!(untouched.parent_category_id, None);
    Ok(())
}

#[tokio::test]
async fn deleting_a_user_cascades_to_carts_and_their_items() -> anyhow::Result<()> {
    let conn = setup().await?;
    let catalog = seed_catalog(&conn).await?;

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let u1 = UserRepository::new(&factory).add(user("bob")).await?;
    let c1 = CartRepository::new(&factory).add(cart(u1.id)).await?;
    let item = CartItemRepository::new(&factory)
        .add(cart_item(c1.id, catalog.products[0].id, 2))
        .await?;
    uow.commit().await?;
    uow.dispose().await;

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    assert!(UserRepository::new(&factory).delete_by_id(u1.id).await?);
    uow.commit().await?;
    uow.dispose().await;

    assert!(reload::<Users>(&conn, u1.id).await?.is_none());
    assert!(reload::<Carts>(&conn, c1.id).await?.is_none());
    assert!(reload::<CartItems>(&conn, item.id).await?.is_none());
    assert!(reload::<Products>(&conn, catalog.products[0].id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn ordered_products_are_freed_once_the_order_is_deleted() -> anyhow::Result<()> {
    let conn = setup().await?;
    let catalog = seed_catalog(&conn).await?;
    let (mug, cup) = (catalog.products[0].clone(), catalog.products[1].clone());

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let o1 = OrderRepository::new(&factory)
        .add(order(catalog.user.id, 0))
        .await?;
    let details = OrderDetailRepository::new(&factory);
    details.add(order_detail(o1.id, mug.id, 1, 1200)).await?;
    details.add(order_detail(o1.id, cup.id, 2, 900)).await?;
    uow.commit().await?;
    uow.dispose().await;

    let factory = SessionFactory::new(conn.clone());
    let err = ProductRepository::new(&factory)
        .delete_by_id(mug.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::ConstraintViolation(_)), "{err:?}");
    factory.dispose().await;
    assert!(reload::<Products>(&conn, mug.id).await?.is_some());

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    assert!(OrderRepository::new(&factory).delete_by_id(o1.id).await?);
    assert!(ProductRepository::new(&factory).delete_by_id(mug.id).await?);
    uow.commit().await?;
    uow.dispose().await;

    assert!(reload::<Orders>(&conn, o1.id).await?.is_none());
    assert!(reload::<OrderDetails>(&conn, (o1.id, mug.id)).await?.is_none());
    assert!(reload::<OrderDetails>(&conn, (o1.id, cup.id)).await?.is_none());
    assert!(reload::<Products>(&conn, mug.id).await?.is_none());
    assert!(reload::<Products>(&conn, cup.id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn user_role_rows_hold_both_sides_in_place() -> anyhow::Result<()> {
    let conn = setup().await?;

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let carol = UserRepository::new(&factory).add(user("carol")).await?;
    let admin = RoleRepository::new(&factory)
        .add(roles::Model {
            id: Uuid::new_v4(),
            name: "admin".into(),
        })
        .await?;
    let grant = UserRoleRepository::new(&factory)
        .add(user_roles::Model {
            id: Uuid::new_v4(),
            user_id: carol.id,
            role_id: admin.id,
        })
        .await?;
    uow.commit().await?;
    uow.dispose().await;

    let factory = SessionFactory::new(conn.clone());
    let err = UserRepository::new(&factory)
        .delete_by_id(carol.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::ConstraintViolation(_)), "{err:?}");
    factory.dispose().await;

    let factory = SessionFactory::new(conn.clone());
    let err = RoleRepository::new(&factory)
        .delete_by_id(admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::ConstraintViolation(_)), "{err:?}");
    factory.dispose().await;

    // Removing the grant first frees both.
    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    assert!(UserRoleRepository::new(&factory).delete_by_id(grant.id).await?);
    assert!(UserRepository::new(&factory).delete_by_id(carol.id).await?);
    assert!(RoleRepository::new(&factory).delete_by_id(admin.id).await?);
    uow.commit().await?;
    uow.dispose().await;

    assert!(reload::<UserRoles>(&conn, grant.id).await?.is_none());
    assert!(reload::<Users>(&conn, carol.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn reviews_and_orders_keep_their_author_alive() -> anyhow::Result<()> {
    let conn = setup().await?;
    let catalog = seed_catalog(&conn).await?;
    let mug = &catalog.products[0];

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let reviewer = UserRepository::new(&factory).add(user("grace")).await?;
    let written = ReviewRepository::new(&factory)
        .add(review(reviewer.id, mug.id, 4))
        .await?;
    let placed = OrderRepository::new(&factory)
        .add(order(catalog.user.id, 0))
        .await?;
    uow.commit().await?;
    uow.dispose().await;

    for (id, label) in [(reviewer.id, "reviewer"), (catalog.user.id, "customer")] {
        let factory = SessionFactory::new(conn.clone());
        let err = UserRepository::new(&factory).delete_by_id(id).await.unwrap_err();
        assert!(matches!(err, DataError::ConstraintViolation(_)), "{label}: {err:?}");
        let err = UnitOfWork::new(Arc::clone(&factory)).commit().await.unwrap_err();
        assert!(matches!(err, DataError::ConstraintViolation(_)), "{label}: {err:?}");
        factory.dispose().await;
    }

    assert!(reload::<Users>(&conn, reviewer.id).await?.is_some());
    assert!(reload::<Users>(&conn, catalog.user.id).await?.is_some());
    assert!(reload::<Reviews>(&conn, written.id).await?.is_some());
    assert!(reload::<Orders>(&conn, placed.id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn deleting_a_product_removes_its_reviews_and_wishlist_entries() -> anyhow::Result<()> {
    let conn = setup().await?;
    let catalog = seed_catalog(&conn).await?;
    let (mug, cup) = (&catalog.products[0], &catalog.products[1]);

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let reviews = ReviewRepository::new(&factory);
    let wishlists = WishlistRepository::new(&factory);
    let on_mug = reviews.add(review(catalog.user.id, mug.id, 5)).await?;
    let on_cup = reviews.add(review(catalog.user.id, cup.id, 3)).await?;
    let wanted_mug = wishlists.add(wishlist(catalog.user.id, mug.id)).await?;
    let wanted_cup = wishlists.add(wishlist(catalog.user.id, cup.id)).await?;
    uow.commit().await?;
    uow.dispose().await;

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    assert!(ProductRepository::new(&factory).delete_by_id(mug.id).await?);
    uow.commit().await?;
    uow.dispose().await;

    assert!(reload::<Products>(&conn, mug.id).await?.is_none());
    assert!(reload::<Reviews>(&conn, on_mug.id).await?.is_none());
    assert!(reload::<Wishlists>(&conn, wanted_mug.id).await?.is_none());
    assert!(reload::<Reviews>(&conn, on_cup.id).await?.is_some());
    assert!(reload::<Wishlists>(&conn, wanted_cup.id).await?.is_some());
    assert!(reload::<Users>(&conn, catalog.user.id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn deleting_a_user_removes_their_wishlist() -> anyhow::Result<()> {
    let conn = setup().await?;
    let catalog = seed_catalog(&conn).await?;
    let mug = &catalog.products[0];

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let browser = UserRepository::new(&factory).add(user("heidi")).await?;
    let wishlists = WishlistRepository::new(&factory);
    let theirs = wishlists.add(wishlist(browser.id, mug.id)).await?;
    let kept = wishlists.add(wishlist(catalog.user.id, mug.id)).await?;
    uow.commit().await?;
    uow.dispose().await;

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let users = UserRepository::new(&factory);
    let tracked = users.get_by_id(browser.id).await?.expect("user");
    users.delete(&tracked).await?;
    uow.commit().await?;
    uow.dispose().await;

    assert!(reload::<Users>(&conn, browser.id).await?.is_none());
    assert!(reload::<Wishlists>(&conn, theirs.id).await?.is_none());
    assert!(reload::<Wishlists>(&conn, kept.id).await?.is_some());
    assert!(reload::<Products>(&conn, mug.id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn optional_references_block_deleting_brands_and_discount_codes() -> anyhow::Result<()> {
    let conn = setup().await?;
    let catalog = seed_catalog(&conn).await?;

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    let acme = BrandRepository::new(&factory).add(brand("Acme")).await?;
    let unused = BrandRepository::new(&factory).add(brand("Nobody")).await?;
    let branded = ProductRepository::new(&factory)
        .add(products::Model {
            brand_id: Some(acme.id),
            ..product(catalog.category.id, "Acme Kettle", 4500, 6)
        })
        .await?;
    let spring = DiscountCodeRepository::new(&factory)
        .add(discount_code("SPRING"))
        .await?;
    let discounted = OrderRepository::new(&factory)
        .add(orders::Model {
            discount_code_id: Some(spring.id),
            ..order(catalog.user.id, 0)
        })
        .await?;
    uow.commit().await?;
    uow.dispose().await;

    let factory = SessionFactory::new(conn.clone());
    let err = BrandRepository::new(&factory).delete_by_id(acme.id).await.unwrap_err();
    assert!(matches!(err, DataError::ConstraintViolation(_)), "{err:?}");
    factory.dispose().await;

    let factory = SessionFactory::new(conn.clone());
    let err = DiscountCodeRepository::new(&factory)
        .delete_by_id(spring.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::ConstraintViolation(_)), "{err:?}");
    factory.dispose().await;

    let factory = SessionFactory::new(conn.clone());
    let uow = UnitOfWork::new(Arc::clone(&factory));
    assert!(BrandRepository::new(&factory).delete_by_id(unused.id).await?);
    uow.commit().await?;
    uow.dispose().await;

    assert!(reload::<Brands>(&conn, acme.id).await?.is_some());
    assert!(reload::<Brands>(&conn, unused.id).await?.is_none());
    assert!(reload::<DiscountCodes>(&conn, spring.id).await?.is_some());
    assert_eq!(reload::<Products>(&conn, branded.id).await?.and_then(|p| p.brand_id), Some(acme.id));
    assert_eq!(
        reload::<Orders>(&conn, discounted.id).await?.and_then(|o| o.discount_code_id),
        Some(spring.id)
    );
    Ok(())
}
