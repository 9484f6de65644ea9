use crate::validation::{Field, Schema};

pub static REVIEW_SCHEMA: Schema = Schema::new(
    "review",
    &[
        Field::required("userid"),
        Field::required("businessid"),
        Field::required("dollars"),
        Field::required("stars"),
        Field::optional("review"),
    ],
);
