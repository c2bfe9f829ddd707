//! SQLite reserved words.

/// Words reserved by SQLite on top of the generic ones. Uppercase, sorted.
pub static SQLITE_KEYWORDS: &[&str] = &[
    "ANALYZE",
    "ATTACH",
    "CONFLICT",
    "DATABASE",
    "DEFERRABLE",
    "DEFERRED",
    "DETACH",
    "EACH",
    "EXCEPT",
    "EXCLUSIVE",
    "FAIL",
    "GLOB",
    "IMMEDIATE",
    "INITIALLY",
    "INSTEAD",
    "INTERSECT",
    "PLAN",
    "PRAGMA",
    "QUERY",
    "RAISE",
    "REGEXP",
    "REINDEX",
    "RELEASE",
    "RENAME",
    "SAVEPOINT",
    "VACUUM",
    "VIRTUAL",
    "WITH",
    "WITHOUT",
];
