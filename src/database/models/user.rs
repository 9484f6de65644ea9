use serde_json::{Map, Value};

use crate::validation::{Field, Schema};

/// Column holding the bcrypt digest. Never leaves the server.
pub const PASSWORD_FIELD: &str = "password";

pub static USER_SCHEMA: Schema = Schema::new(
    "user",
    &[
        Field::required("name"),
        Field::required("email"),
        Field::required(PASSWORD_FIELD),
        Field::optional("admin"),
    ],
);

/// Strip the password digest from a user row before it is returned.
pub fn redact(mut row: Map<String, Value>) -> Map<String, Value> {
    row.remove(PASSWORD_FIELD);
    row
}
