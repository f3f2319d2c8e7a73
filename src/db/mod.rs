pub mod migrations;
pub mod repository;

#[cfg(test)]
pub(crate) fn test_conn() -> rusqlite::Connection {
    let conn = rusqlite::Connection::open_in_memory().expect("in-memory sqlite");
    migrations::run_migrations(&conn).expect("migrations");
    conn
}
