use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::{Query, Repository};
use crate::{
    entity::{
        roles::{self, Entity as Roles},
        user_roles::{self, Entity as UserRoles},
        users::{self, Entity as Users},
    },
    error::DataResult,
};

pub type UserRepository = Repository<Users>;
pub type RoleRepository = Repository<Roles>;
pub type UserRoleRepository = Repository<UserRoles>;

impl Repository<Users> {
    pub async fn by_email(&self, email: &str) -> DataResult<Option<users::Model>> {
        self.find(users::Column::Email.eq(email)).one().await
    }

    pub async fn by_user_name(&self, user_name: &str) -> DataResult<Option<users::Model>> {
        self.find(users::Column::UserName.eq(user_name)).one().await
    }
}

impl Repository<Roles> {
    pub async fn by_name(&self, name: &str) -> DataResult<Option<roles::Model>> {
        self.find(roles::Column::Name.eq(name)).one().await
    }

    /// Roles granted to `user_id` through its user-role rows.
    pub fn for_user(&self, user_id: Uuid) -> Query<'_, Roles> {
        self.query(
            Roles::find()
                .inner_join(UserRoles)
                .filter(user_roles::Column::UserId.eq(user_id))
                .order_by_asc(roles::Column::Name),
        )
    }
}

impl Repository<UserRoles> {
    pub fn for_user(&self, user_id: Uuid) -> Query<'_, UserRoles> {
        self.find(user_roles::Column::UserId.eq(user_id))
    }

    pub fn for_role(&self, role_id: Uuid) -> Query<'_, UserRoles> {
        self.find(user_roles::Column::RoleId.eq(role_id))
    }
}
