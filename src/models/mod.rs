pub mod auth;
pub mod department;
pub mod employee;
pub mod manager;

fn page_limit(requested: Option<i64>, default_limit: i64) -> i64 {
    match requested {
        Some(limit) if limit > 0 => limit,
        _ => default_limit,
    }
}

fn page_offset(requested: Option<i64>) -> i64 {
    requested.unwrap_or(0).max(0)
}
