use crate::validation::{Field, Schema};

pub static BUSINESS_SCHEMA: Schema = Schema::new(
    "business",
    &[
        Field::required("ownerid"),
        Field::required("name"),
        Field::required("address"),
        Field::required("city"),
        Field::required("state"),
        Field::required("zip"),
        Field::required("phone"),
        Field::required("category"),
        Field::required("subcategory"),
        Field::optional("website"),
        Field::optional("email"),
    ],
);
