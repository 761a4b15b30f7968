// Decimal columns are TEXT so values round-trip without binary float loss.

diesel::table! {
    projects (project_id) {
        project_id -> Integer,
        name -> Text,
        location -> Nullable<Text>,
        capacity_mw -> Text,
        capex -> Text,
        opex_annual -> Text,
        ppa_price -> Text,
        degradation_pct -> Text,
        cf_year1 -> Text,
        cod_year -> Nullable<Integer>,
    }
}

diesel::table! {
    financing (financing_id) {
        financing_id -> Integer,
        project_id -> Integer,
        tax_credit_pct -> Text,
        debt_pct -> Text,
        interest_rate -> Text,
        term_years -> Integer,
    }
}

diesel::table! {
    proforma_results (result_id) {
        result_id -> Integer,
        project_id -> Integer,
        run_date -> Text,
        discount_rate -> Text,
        npv -> Text,
        irr -> Text,
        irr_converged -> Bool,
        payback_year -> Nullable<Integer>,
        min_dscr -> Nullable<Text>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(projects, financing, proforma_results);

/// DDL run by `SqliteStore::create`. Drops and recreates every table.
pub const CREATE_SCHEMA: &str = "
    DROP TABLE IF EXISTS proforma_results;
    DROP TABLE IF EXISTS financing;
    DROP TABLE IF EXISTS projects;

    CREATE TABLE projects (
        project_id      INTEGER PRIMARY KEY AUTOINCREMENT,
        name            TEXT NOT NULL,
        location        TEXT,
        capacity_mw     TEXT NOT NULL,
        capex           TEXT NOT NULL,
        opex_annual     TEXT NOT NULL,
        ppa_price       TEXT NOT NULL,
        degradation_pct TEXT NOT NULL,
        cf_year1        TEXT NOT NULL,
        cod_year        INTEGER
    );

    CREATE TABLE financing (
        financing_id    INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id      INTEGER NOT NULL REFERENCES projects(project_id),
        tax_credit_pct  TEXT NOT NULL,
        debt_pct        TEXT NOT NULL,
        interest_rate   TEXT NOT NULL,
        term_years      INTEGER NOT NULL
    );

    CREATE TABLE proforma_results (
        result_id       INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id      INTEGER NOT NULL REFERENCES projects(project_id),
        run_date        TEXT NOT NULL,
        discount_rate   TEXT NOT NULL,
        npv             TEXT NOT NULL,
        irr             TEXT NOT NULL,
        irr_converged   BOOLEAN NOT NULL,
        payback_year    INTEGER,
        min_dscr        TEXT
    );
";
