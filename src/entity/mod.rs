pub mod brands;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod discount_codes;
pub mod order_details;
pub mod orders;
pub mod product_images;
pub mod product_variant_images;
pub mod product_variants;
pub mod products;
pub mod reviews;
pub mod roles;
pub mod user_roles;
pub mod users;
pub mod wishlists;

pub use brands::Entity as Brands;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use categories::Entity as Categories;
pub use discount_codes::Entity as DiscountCodes;
pub use order_details::Entity as OrderDetails;
pub use orders::Entity as Orders;
pub use product_images::Entity as ProductImages;
pub use product_variant_images::Entity as ProductVariantImages;
pub use product_variants::Entity as ProductVariants;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use roles::Entity as Roles;
pub use user_roles::Entity as UserRoles;
pub use users::Entity as Users;
pub use wishlists::Entity as Wishlists;

use uuid::Uuid;

use crate::repository::Record;

macro_rules! surrogate_key {
    ($($module:ident),* $(,)?) => {
        $(
            impl Record for $module::Entity {
                type Key = Uuid;
                type Active = $module::ActiveModel;

                fn key(model: &$module::Model) -> Uuid {
                    model.id
                }

                fn key_parts(key: &Uuid) -> Vec<Uuid> {
                    vec![*key]
                }
            }
        )*
    };
}

surrogate_key!(
    brands,
    cart_items,
    carts,
    categories,
    discount_codes,
    orders,
    product_images,
    product_variant_images,
    product_variants,
    products,
    reviews,
    roles,
    user_roles,
    users,
    wishlists,
);

impl Record for order_details::Entity {
    type Key = (Uuid, Uuid);
    type Active = order_details::ActiveModel;

    fn key(model: &order_details::Model) -> (Uuid, Uuid) {
        (model.order_id, model.product_id)
    }

    fn key_parts(key: &(Uuid, Uuid)) -> Vec<Uuid> {
        vec![key.0, key.1]
    }
}
