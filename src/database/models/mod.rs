pub mod business;
pub mod photo;
pub mod review;
pub mod user;

use crate::validation::{Schema, SchemaError};

pub use business::BUSINESS_SCHEMA;
pub use photo::PHOTO_SCHEMA;
pub use review::REVIEW_SCHEMA;
pub use user::USER_SCHEMA;

/// The resource collections the API exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Business,
    Review,
    Photo,
    User,
}

impl Resource {
    pub const ALL: [Resource; 4] = [Resource::Business, Resource::Review, Resource::Photo, Resource::User];

    pub fn table(self) -> &'static str {
        match self {
            Resource::Business => "businesses",
            Resource::Review => "reviews",
            Resource::Photo => "photos",
            Resource::User => "users",
        }
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            Resource::Business => &BUSINESS_SCHEMA,
            Resource::Review => &REVIEW_SCHEMA,
            Resource::Photo => &PHOTO_SCHEMA,
            Resource::User => &USER_SCHEMA,
        }
    }

    /// Column naming the user that owns a row, if the resource is owner-scoped
    pub fn owner_column(self) -> Option<&'static str> {
        match self {
            Resource::Business => Some("ownerid"),
            Resource::Review | Resource::Photo => Some("userid"),
            Resource::User => None,
        }
    }

    /// Collection path, also used as the pagination link base
    pub fn path(self) -> String {
        format!("/{}", self.table())
    }

    pub fn link(self, id: i64) -> String {
        format!("/{}/{}", self.table(), id)
    }
}

/// Startup check over every declared schema.
pub fn check_schemas() -> Result<(), SchemaError> {
    Resource::ALL.iter().try_for_each(|r| r.schema().check())
}
