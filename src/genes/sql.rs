use super::Gene;

/// Value that must be sent exactly as it was read
#[derive(Debug, Clone)]
pub struct ImmutableDataHolderGene {
    pub value: String,
}

impl ImmutableDataHolderGene {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Primary key column of a row inserted by a database action
#[derive(Debug, Clone)]
pub struct SqlPrimaryKeyGene {
    pub table: String,
    /// Identifies the row among all database actions of an individual
    pub unique_id: i64,
    pub gene: Box<Gene>,
}

impl SqlPrimaryKeyGene {
    pub fn new(table: impl Into<String>, unique_id: i64, gene: Gene) -> Self {
        Self {
            table: table.into(),
            unique_id,
            gene: Box::new(gene),
        }
    }

    /// Key values are generated by the database
    pub fn is_auto_increment(&self) -> bool {
        matches!(self.gene.kind, super::GeneKind::SqlAutoIncrement)
    }
}

#[derive(Debug, Clone)]
pub struct SqlForeignKeyGene {
    pub target_table: String,
    pub unique_id_of_primary_key: i64,
}

impl SqlForeignKeyGene {
    pub fn new(target_table: impl Into<String>, unique_id_of_primary_key: i64) -> Self {
        Self {
            target_table: target_table.into(),
            unique_id_of_primary_key,
        }
    }
}
