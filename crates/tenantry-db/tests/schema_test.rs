//! Integration tests for schema bootstrap using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_defines_tenant_and_user_tables() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    tenantry_db::init_schema(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info_str = format!("{:?}", info.expect("INFO FOR DB should return a value"));

    assert!(info_str.contains("tenant"), "missing tenant table");
    assert!(info_str.contains("user"), "missing user table");
}

#[tokio::test]
async fn bootstrap_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    tenantry_db::init_schema(&db).await.unwrap();
    tenantry_db::init_schema(&db).await.unwrap();
}

#[tokio::test]
async fn email_index_rejects_duplicates() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tenantry_db::init_schema(&db).await.unwrap();

    let insert = "CREATE user SET tenant_id = 't', email = 'dup@example.com', \
                  password_hash = 'h'";
    db.query(insert).await.unwrap().check().unwrap();

    let second = db.query(insert).await.unwrap().check();
    assert!(second.is_err(), "duplicate email should violate the index");
}

#[tokio::test]
async fn schemafull_user_rejects_missing_fields() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tenantry_db::init_schema(&db).await.unwrap();

    let result = db
        .query("CREATE user SET email = 'nohash@example.com'")
        .await
        .unwrap()
        .check();
    assert!(result.is_err());
}
