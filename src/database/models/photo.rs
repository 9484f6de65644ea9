use crate::validation::{Field, Schema};

pub static PHOTO_SCHEMA: Schema = Schema::new(
    "photo",
    &[
        Field::required("userid"),
        Field::required("businessid"),
        Field::optional("caption"),
    ],
);
