//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Customer companies, one per business owner.
    companies (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Label designs registered to a company.
    labels (id) {
        id -> Uuid,
        company_id -> Uuid,
        name -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Order rows; `status` and `payment_status` hold snake_case names.
    orders (id) {
        id -> Uuid,
        owner_id -> Uuid,
        label_id -> Uuid,
        variant -> Text,
        quantity -> Int4,
        cap_color -> Text,
        volume -> Int4,
        status -> Text,
        payment_status -> Text,
        decline_reason -> Nullable<Text>,
        payment_proof_url -> Nullable<Text>,
        invoice_url -> Nullable<Text>,
        pi_url -> Nullable<Text>,
        expected_delivery -> Timestamptz,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only status history ledger.
    order_status_history (id) {
        id -> Int8,
        order_id -> Uuid,
        status -> Text,
        changed_by -> Uuid,
        changed_at -> Timestamptz,
        reason -> Nullable<Text>,
    }
}

diesel::table! {
    /// Per-stage assignment ledger. Open rows have a null `completed_at`.
    order_assignments (id) {
        id -> Int8,
        order_id -> Uuid,
        stage -> Text,
        actor_id -> Uuid,
        assigned_at -> Timestamptz,
        deadline -> Timestamptz,
        completed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    order_comments (id) {
        id -> Uuid,
        order_id -> Uuid,
        author_id -> Uuid,
        author_role -> Text,
        body -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Print-job details, at most one row per order.
    order_label_jobs (order_id) {
        order_id -> Uuid,
        no_of_sheets -> Int4,
        cutting_type -> Text,
        labels_per_sheet -> Int4,
        description -> Nullable<Text>,
        updated_by -> Uuid,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(labels -> companies (company_id));
diesel::joinable!(orders -> labels (label_id));
diesel::joinable!(order_status_history -> orders (order_id));
diesel::joinable!(order_assignments -> orders (order_id));
diesel::joinable!(order_comments -> orders (order_id));
diesel::joinable!(order_label_jobs -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(
    companies,
    labels,
    orders,
    order_status_history,
    order_assignments,
    order_comments,
    order_label_jobs,
);
