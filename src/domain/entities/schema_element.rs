use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaElementKind {
    Table,
    Column,
    Relationship,
}

impl SchemaElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaElementKind::Table => "table",
            SchemaElementKind::Column => "column",
            SchemaElementKind::Relationship => "relationship",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "table" => Some(SchemaElementKind::Table),
            "column" => Some(SchemaElementKind::Column),
            "relationship" => Some(SchemaElementKind::Relationship),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub constrained_columns: Vec<String>,
    pub referred_table: String,
    pub referred_columns: Vec<String>,
}

/// A single schema fact that gets embedded into the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaElement {
    kind: SchemaElementKind,
    table_name: String,
    column_name: Option<String>,
    column_type: Option<String>,
    foreign_key: Option<ForeignKey>,
    text: String,
}

impl SchemaElement {
    pub fn table(table_name: &str) -> Self {
        Self {
            kind: SchemaElementKind::Table,
            table_name: table_name.to_string(),
            column_name: None,
            column_type: None,
            foreign_key: None,
            text: format!("Table: {}", table_name),
        }
    }

    pub fn column(table_name: &str, column_name: &str, column_type: &str) -> Self {
        Self {
            kind: SchemaElementKind::Column,
            table_name: table_name.to_string(),
            column_name: Some(column_name.to_string()),
            column_type: Some(column_type.to_string()),
            foreign_key: None,
            text: format!(
                "Table {}, Column {} (type: {})",
                table_name, column_name, column_type
            ),
        }
    }

    pub fn relationship(table_name: &str, foreign_key: ForeignKey) -> Self {
        let text = format!(
            "Table {} has foreign key [{}] referencing {}.[{}]",
            table_name,
            foreign_key.constrained_columns.join(", "),
            foreign_key.referred_table,
            foreign_key.referred_columns.join(", ")
        );

        Self {
            kind: SchemaElementKind::Relationship,
            table_name: table_name.to_string(),
            column_name: None,
            column_type: None,
            foreign_key: Some(foreign_key),
            text,
        }
    }

    /// Rebuild an element from stored values (for repository reconstruction)
    pub fn from_database(
        kind: SchemaElementKind,
        table_name: String,
        column_name: Option<String>,
        column_type: Option<String>,
        foreign_key: Option<ForeignKey>,
        text: String,
    ) -> Self {
        Self {
            kind,
            table_name,
            column_name,
            column_type,
            foreign_key,
            text,
        }
    }

    pub fn kind(&self) -> SchemaElementKind {
        self.kind
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn column_name(&self) -> Option<&str> {
        self.column_name.as_deref()
    }

    pub fn column_type(&self) -> Option<&str> {
        self.column_type.as_deref()
    }

    pub fn foreign_key(&self) -> Option<&ForeignKey> {
        self.foreign_key.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_column(&self) -> bool {
        self.kind == SchemaElementKind::Column
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_texts() {
        assert_eq!(SchemaElement::table("companies").text(), "Table: companies");

        let column = SchemaElement::column("companies", "ticker", "character varying");
        assert_eq!(
            column.text(),
            "Table companies, Column ticker (type: character varying)"
        );
        assert!(column.is_column());
        assert_eq!(column.column_name(), Some("ticker"));

        let relationship = SchemaElement::relationship(
            "financial_statements",
            ForeignKey {
                constrained_columns: vec!["company_id".to_string()],
                referred_table: "companies".to_string(),
                referred_columns: vec!["id".to_string()],
            },
        );
        assert_eq!(
            relationship.text(),
            "Table financial_statements has foreign key [company_id] referencing companies.[id]"
        );
        assert_eq!(relationship.kind(), SchemaElementKind::Relationship);
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [
            SchemaElementKind::Table,
            SchemaElementKind::Column,
            SchemaElementKind::Relationship,
        ] {
            assert_eq!(SchemaElementKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(SchemaElementKind::parse("index"), None);
    }
}
