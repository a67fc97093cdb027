pub mod db;
pub mod mssql;
pub mod schema;
#[cfg(test)]
pub mod testing;
