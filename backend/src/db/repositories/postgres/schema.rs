// Document collections: one JSONB body per row, keyed by the hex document id.
// Created at startup with `CREATE TABLE IF NOT EXISTS` (see `ensure_collections`).

diesel::table! {
    lessons (id) {
        id -> Text,
        document -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    orders (id) {
        id -> Text,
        document -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(lessons, orders);
