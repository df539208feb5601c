use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::Text;

use crate::application::ports::SchemaCatalog;
use crate::application::ports::schema_catalog::{ColumnInfo, SchemaCatalogError, TableInfo};
use crate::domain::entities::ForeignKey;
use crate::infrastructure::database::{DbPool, with_connection};

/// Tables that hold bookkeeping rather than data users ask about.
const EXCLUDED_TABLES: [&str; 2] = ["__diesel_schema_migrations", "schema_embeddings"];

const COLUMNS_QUERY: &str = "
SELECT c.table_name::text AS table_name,
       c.column_name::text AS column_name,
       c.data_type::text AS data_type
FROM information_schema.columns c
JOIN information_schema.tables t
  ON t.table_schema = c.table_schema AND t.table_name = c.table_name
WHERE c.table_schema = 'public' AND t.table_type = 'BASE TABLE'
ORDER BY c.table_name, c.ordinal_position";

const FOREIGN_KEYS_QUERY: &str = "
SELECT tc.table_name::text AS table_name,
       tc.constraint_name::text AS constraint_name,
       kcu.column_name::text AS column_name,
       ccu.table_name::text AS referred_table,
       ccu.column_name::text AS referred_column
FROM information_schema.table_constraints tc
JOIN information_schema.key_column_usage kcu
  ON kcu.constraint_name = tc.constraint_name AND kcu.table_schema = tc.table_schema
JOIN information_schema.constraint_column_usage ccu
  ON ccu.constraint_name = tc.constraint_name AND ccu.table_schema = tc.table_schema
WHERE tc.constraint_type = 'FOREIGN KEY' AND tc.table_schema = 'public'
ORDER BY tc.table_name, tc.constraint_name, kcu.ordinal_position";

#[derive(Debug, Clone, QueryableByName)]
struct ColumnRow {
    #[diesel(sql_type = Text)]
    table_name: String,
    #[diesel(sql_type = Text)]
    column_name: String,
    #[diesel(sql_type = Text)]
    data_type: String,
}

#[derive(Debug, Clone, QueryableByName)]
struct ForeignKeyRow {
    #[diesel(sql_type = Text)]
    table_name: String,
    #[diesel(sql_type = Text)]
    constraint_name: String,
    #[diesel(sql_type = Text)]
    column_name: String,
    #[diesel(sql_type = Text)]
    referred_table: String,
    #[diesel(sql_type = Text)]
    referred_column: String,
}

/// Reads the live schema from `information_schema`.
pub struct PostgresSchemaCatalog {
    pool: DbPool,
}

impl PostgresSchemaCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaCatalog for PostgresSchemaCatalog {
    async fn list_tables(&self) -> Result<Vec<TableInfo>, SchemaCatalogError> {
        let (columns, foreign_keys) = with_connection(&self.pool, |conn| {
            let columns = diesel::sql_query(COLUMNS_QUERY).load::<ColumnRow>(conn)?;
            let foreign_keys = diesel::sql_query(FOREIGN_KEYS_QUERY).load::<ForeignKeyRow>(conn)?;
            Ok((columns, foreign_keys))
        })
        .await
        .map_err(|e| SchemaCatalogError::DatabaseError(format!("Failed to inspect schema: {}", e)))?;

        Ok(group_tables(columns, foreign_keys))
    }
}

/// Folds flat catalog rows into one entry per table; multi-column keys
/// arrive as several rows sharing a constraint name.
fn group_tables(columns: Vec<ColumnRow>, foreign_keys: Vec<ForeignKeyRow>) -> Vec<TableInfo> {
    let mut tables: Vec<TableInfo> = Vec::new();

    for row in columns {
        if EXCLUDED_TABLES.contains(&row.table_name.as_str()) {
            continue;
        }
        let column = ColumnInfo {
            name: row.column_name,
            data_type: row.data_type,
        };
        match tables.last_mut() {
            Some(table) if table.name == row.table_name => table.columns.push(column),
            _ => tables.push(TableInfo {
                name: row.table_name,
                columns: vec![column],
                foreign_keys: Vec::new(),
            }),
        }
    }

    let mut current: Option<(String, String)> = None;
    for row in foreign_keys {
        let Some(table) = tables.iter_mut().find(|t| t.name == row.table_name) else {
            continue;
        };
        let key = (row.table_name.clone(), row.constraint_name.clone());

        let same_constraint = current.as_ref() == Some(&key);
        match table.foreign_keys.last_mut() {
            Some(fk) if same_constraint => {
                if !fk.constrained_columns.contains(&row.column_name) {
                    fk.constrained_columns.push(row.column_name);
                }
                if !fk.referred_columns.contains(&row.referred_column) {
                    fk.referred_columns.push(row.referred_column);
                }
            }
            _ => table.foreign_keys.push(ForeignKey {
                constrained_columns: vec![row.column_name],
                referred_table: row.referred_table,
                referred_columns: vec![row.referred_column],
            }),
        }
        current = Some(key);
    }

    tables
}
