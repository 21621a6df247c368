//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; regenerate with
//! `diesel print-schema` after schema changes.

diesel::table! {
    /// Registered accounts, both customers and business sellers.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        /// Stored as supplied; uniqueness is enforced on the lowercase form.
        email -> Varchar,
        password_hash -> Text,
        /// `customer` or `business`.
        role -> Varchar,
        is_active -> Bool,
        is_staff -> Bool,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        file -> Nullable<Varchar>,
        location -> Nullable<Varchar>,
        tel -> Nullable<Varchar>,
        description -> Nullable<Text>,
        working_hours -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bearer tokens, one per user.
    auth_tokens (token) {
        token -> Varchar,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Outstanding password-reset tokens, looked up by email at consumption.
    password_resets (token) {
        token -> Varchar,
        email -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Seller listings.
    offers (id) {
        id -> Uuid,
        owner_id -> Uuid,
        title -> Varchar,
        description -> Text,
        image -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Pricing tiers; exactly three per offer, unique per (offer, kind).
    offer_details (id) {
        id -> Uuid,
        offer_id -> Uuid,
        title -> Varchar,
        revisions -> Int4,
        delivery_time_in_days -> Int4,
        price -> Numeric,
        features -> Array<Text>,
        /// `basic`, `standard`, or `premium`.
        offer_type -> Varchar,
    }
}

diesel::table! {
    /// Purchase snapshots; tier fields are copies frozen at creation time.
    orders (id) {
        id -> Uuid,
        customer_user_id -> Uuid,
        business_user_id -> Uuid,
        title -> Varchar,
        revisions -> Int4,
        delivery_time_in_days -> Int4,
        price -> Numeric,
        features -> Array<Text>,
        offer_type -> Varchar,
        /// `in_progress`, `completed`, or `cancelled`.
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Customer feedback; unique per (business_user, reviewer).
    reviews (id) {
        id -> Uuid,
        business_user_id -> Uuid,
        reviewer_id -> Uuid,
        rating -> Int4,
        description -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(auth_tokens -> users (user_id));
diesel::joinable!(offer_details -> offers (offer_id));
diesel::joinable!(offers -> users (owner_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    auth_tokens,
    password_resets,
    offers,
    offer_details,
    orders,
    reviews,
);
