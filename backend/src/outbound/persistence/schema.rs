//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`.

diesel::table! {
    users (id) {
        id -> Uuid,
        first_name -> Text,
        last_name -> Text,
        pseudo -> Text,
        email -> Text,
        password_hash -> Nullable<Text>,
        password_salt -> Nullable<Text>,
        friends -> Array<Uuid>,
        shared_with_me -> Array<Text>,
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    lists (id) {
        id -> Uuid,
        code -> Text,
        owner_id -> Uuid,
        name -> Text,
        shared_with -> Jsonb,
        content -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, lists);
