//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. When a
//! migration changes a table, regenerate with `diesel print-schema` or edit
//! by hand.

diesel::table! {
    /// Accounts. `role` is constrained to `ADMIN` or `USER`.
    users (id) {
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        display_name -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        role -> Varchar,
        is_active -> Bool,
        /// Set while the account holds a system-generated password.
        must_change_password -> Bool,
        /// Administrator who created the account; nulled when they are deleted.
        created_by_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Named collections of call records, one owner each.
    log_lists (id) {
        id -> Uuid,
        name -> Varchar,
        /// Owning user; lists cascade with their owner.
        owner_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Individual logged calls. Rows cascade with their list.
    call_logs (id) {
        id -> Uuid,
        call_type -> Varchar,
        log_list_id -> Uuid,
        timestamp -> Timestamptz,
    }
}

diesel::joinable!(log_lists -> users (owner_id));
diesel::joinable!(call_logs -> log_lists (log_list_id));

diesel::allow_tables_to_appear_in_same_query!(users, log_lists, call_logs);
