use diesel::prelude::*;
use pgvector::Vector;

use crate::domain::entities::{ForeignKey, SchemaElement, SchemaElementKind};
use crate::infrastructure::database::schema::schema_embeddings;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema_embeddings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SchemaEmbeddingModel {
    pub id: i32,
    pub kind: String,
    pub table_name: String,
    pub column_name: Option<String>,
    pub column_type: Option<String>,
    pub foreign_key: Option<serde_json::Value>,
    pub content: String,
    pub embedding: Vector,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = schema_embeddings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewSchemaEmbeddingModel {
    pub kind: String,
    pub table_name: String,
    pub column_name: Option<String>,
    pub column_type: Option<String>,
    pub foreign_key: Option<serde_json::Value>,
    pub content: String,
    pub model_name: String,
    pub embedding: Vector,
}

impl NewSchemaEmbeddingModel {
    pub fn new(element: &SchemaElement, model_name: &str, embedding: Vector) -> Self {
        Self {
            kind: element.kind().as_str().to_string(),
            table_name: element.table_name().to_string(),
            column_name: element.column_name().map(str::to_string),
            column_type: element.column_type().map(str::to_string),
            foreign_key: element
                .foreign_key()
                .and_then(|fk| serde_json::to_value(fk).ok()),
            content: element.text().to_string(),
            model_name: model_name.to_string(),
            embedding,
        }
    }
}

impl TryFrom<SchemaEmbeddingModel> for SchemaElement {
    type Error = String;

    fn try_from(model: SchemaEmbeddingModel) -> Result<Self, Self::Error> {
        let kind = SchemaElementKind::parse(&model.kind)
            .ok_or_else(|| format!("Unknown schema element kind: {}", model.kind))?;
        let foreign_key = model
            .foreign_key
            .map(serde_json::from_value::<ForeignKey>)
            .transpose()
            .map_err(|e| format!("Invalid foreign key metadata: {}", e))?;

        Ok(SchemaElement::from_database(
            kind,
            model.table_name,
            model.column_name,
            model.column_type,
            foreign_key,
            model.content,
        ))
    }
}
