//! SQL schema for the jobmart SQLite warehouse.
//!
//! Executed once at connection startup. Every dimension declares a UNIQUE
//! constraint on its natural key and the fact table on its six foreign keys;
//! the insert-or-ignore loads rely on those constraints.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- The source job id doubles as the surrogate key.
CREATE TABLE IF NOT EXISTS job_posting_dim (
    job_id             INTEGER PRIMARY KEY,
    job_title          TEXT    NOT NULL,
    qualifications     TEXT    NOT NULL,
    specialization     TEXT    NOT NULL,
    job_portal         TEXT    NOT NULL,
    skills             TEXT    NOT NULL,
    responsibilities   TEXT    NOT NULL,
    minimum_salary     INTEGER NOT NULL,
    maximum_salary     INTEGER NOT NULL,
    minimum_experience INTEGER NOT NULL,
    maximum_experience INTEGER NOT NULL,
    work_type          TEXT    NOT NULL,
    gender_preference  TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS company_profile_dim (
    company_profile_key INTEGER PRIMARY KEY,
    name                TEXT    NOT NULL,
    sector              TEXT    NOT NULL,
    industry            TEXT    NOT NULL,
    size                INTEGER NOT NULL,
    ticker              TEXT    NOT NULL,
    UNIQUE (name, sector, industry, size, ticker)
);

CREATE TABLE IF NOT EXISTS job_posting_date_dim (
    job_posting_date_key INTEGER PRIMARY KEY,
    day                  INTEGER NOT NULL,
    month                INTEGER NOT NULL,
    year                 INTEGER NOT NULL,
    UNIQUE (day, month, year)
);

-- Flags are INTEGER 0/1.
CREATE TABLE IF NOT EXISTS benefits_dim (
    benefits_key                   INTEGER PRIMARY KEY,
    retirement_plans               INTEGER NOT NULL CHECK (retirement_plans IN (0, 1)),
    stock_options                  INTEGER NOT NULL CHECK (stock_options IN (0, 1)),
    parental_leave                 INTEGER NOT NULL CHECK (parental_leave IN (0, 1)),
    paid_time_off                  INTEGER NOT NULL CHECK (paid_time_off IN (0, 1)),
    flexible_work_arrangements     INTEGER NOT NULL CHECK (flexible_work_arrangements IN (0, 1)),
    health_insurance               INTEGER NOT NULL CHECK (health_insurance IN (0, 1)),
    life_and_disability_insurance  INTEGER NOT NULL CHECK (life_and_disability_insurance IN (0, 1)),
    employee_assistance_program    INTEGER NOT NULL CHECK (employee_assistance_program IN (0, 1)),
    health_and_wellness_facilities INTEGER NOT NULL CHECK (health_and_wellness_facilities IN (0, 1)),
    employee_referral_program      INTEGER NOT NULL CHECK (employee_referral_program IN (0, 1)),
    transportation_benefits        INTEGER NOT NULL CHECK (transportation_benefits IN (0, 1)),
    bonuses_and_incentive_programs INTEGER NOT NULL CHECK (bonuses_and_incentive_programs IN (0, 1)),
    UNIQUE (
        retirement_plans, stock_options, parental_leave, paid_time_off,
        flexible_work_arrangements, health_insurance, life_and_disability_insurance,
        employee_assistance_program, health_and_wellness_facilities,
        employee_referral_program, transportation_benefits,
        bonuses_and_incentive_programs
    )
);

CREATE TABLE IF NOT EXISTS company_hq_location_dim (
    company_hq_location_key INTEGER PRIMARY KEY,
    country                 TEXT NOT NULL,
    city                    TEXT NOT NULL,
    UNIQUE (country, city)
);

CREATE TABLE IF NOT EXISTS job_location_dim (
    job_location_key INTEGER PRIMARY KEY,
    country          TEXT    NOT NULL,
    city             TEXT    NOT NULL,
    city_population  INTEGER NOT NULL,
    UNIQUE (country, city)
);

-- One row per resolvable source record. Measures are filled in post-load.
CREATE TABLE IF NOT EXISTS job_posting_fact (
    fact_key                   INTEGER PRIMARY KEY,
    job_posting_key            INTEGER NOT NULL REFERENCES job_posting_dim(job_id),
    company_profile_key        INTEGER NOT NULL REFERENCES company_profile_dim(company_profile_key),
    job_posting_date_key       INTEGER NOT NULL REFERENCES job_posting_date_dim(job_posting_date_key),
    benefits_key               INTEGER NOT NULL REFERENCES benefits_dim(benefits_key),
    company_hq_location_key    INTEGER NOT NULL REFERENCES company_hq_location_dim(company_hq_location_key),
    job_location_key           INTEGER NOT NULL REFERENCES job_location_dim(job_location_key),
    jobs_per_industry_and_year INTEGER,
    jobs_per_company_and_year  INTEGER,
    UNIQUE (
        job_posting_key, company_profile_key, job_posting_date_key,
        benefits_key, company_hq_location_key, job_location_key
    )
);

CREATE INDEX IF NOT EXISTS fact_date_idx    ON job_posting_fact(job_posting_date_key);
CREATE INDEX IF NOT EXISTS fact_company_idx ON job_posting_fact(company_profile_key);

PRAGMA user_version = 1;
";

/// Fact rows whose keys do not all reference an existing dimension row.
pub const ORPHAN_FACTS: &str = "
SELECT COUNT(*) FROM job_posting_fact f
WHERE NOT EXISTS (SELECT 1 FROM job_posting_dim d WHERE d.job_id = f.job_posting_key)
   OR NOT EXISTS (SELECT 1 FROM company_profile_dim d
                  WHERE d.company_profile_key = f.company_profile_key)
   OR NOT EXISTS (SELECT 1 FROM job_posting_date_dim d
                  WHERE d.job_posting_date_key = f.job_posting_date_key)
   OR NOT EXISTS (SELECT 1 FROM benefits_dim d WHERE d.benefits_key = f.benefits_key)
   OR NOT EXISTS (SELECT 1 FROM company_hq_location_dim d
                  WHERE d.company_hq_location_key = f.company_hq_location_key)
   OR NOT EXISTS (SELECT 1 FROM job_location_dim d
                  WHERE d.job_location_key = f.job_location_key)
";
