use std::collections::{BTreeMap, BTreeSet};

use crate::constraints::Constraint;
use crate::error::{Error, Result};
use crate::schema::DatabaseSchema;
use crate::SCHEMA_VERSION;

/// Validate internal consistency of a database schema.
///
/// This checks:
/// - the contract version is supported
/// - duplicate schemas/tables/columns
/// - primary key and unique columns exist
/// - foreign key columns and referenced targets exist
///
/// Names are compared case-insensitively.
pub fn validate_schema(schema: &DatabaseSchema) -> Result<()> {
    if schema.schema_version != SCHEMA_VERSION {
        return Err(Error::Unsupported(format!(
            "schema_version {} (expected {SCHEMA_VERSION})",
            schema.schema_version
        )));
    }

    let mut catalog: BTreeMap<String, BTreeMap<String, BTreeSet<String>>> = BTreeMap::new();

    for db_schema in &schema.schemas {
        let schema_key = db_schema.name.to_lowercase();
        if catalog.contains_key(&schema_key) {
            return Err(Error::InvalidSchema(format!(
                "duplicate schema name: {}",
                db_schema.name
            )));
        }

        let mut tables = BTreeMap::new();
        for table in &db_schema.tables {
            let table_key = table.name.to_lowercase();
            if tables.contains_key(&table_key) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate table name: {}.{}",
                    db_schema.name, table.name
                )));
            }

            let mut columns = BTreeSet::new();
            for column in &table.columns {
                if !columns.insert(column.name.to_lowercase()) {
                    return Err(Error::InvalidSchema(format!(
                        "duplicate column name: {}.{}.{}",
                        db_schema.name, table.name, column.name
                    )));
                }
            }

            tables.insert(table_key, columns);
        }

        catalog.insert(schema_key, tables);
    }

    for db_schema in &schema.schemas {
        for table in &db_schema.tables {
            let columns = catalog
                .get(&db_schema.name.to_lowercase())
                .and_then(|tables| tables.get(&table.name.to_lowercase()))
                .ok_or_else(|| {
                    Error::InvalidSchema(format!(
                        "missing table in catalog: {}.{}",
                        db_schema.name, table.name
                    ))
                })?;

            let mut primary_keys = 0;
            for constraint in &table.constraints {
                match constraint {
                    Constraint::PrimaryKey(pk) => {
                        primary_keys += 1;
                        if primary_keys > 1 {
                            return Err(Error::InvalidSchema(format!(
                                "multiple primary keys: {}.{}",
                                db_schema.name, table.name
                            )));
                        }
                        for column in &pk.columns {
                            if !columns.contains(&column.to_lowercase()) {
                                return Err(Error::InvalidSchema(format!(
                                    "primary key column not found: {}.{}.{}",
                                    db_schema.name, table.name, column
                                )));
                            }
                        }
                    }
                    Constraint::ForeignKey(fk) => {
                        for column in &fk.columns {
                            if !columns.contains(&column.to_lowercase()) {
                                return Err(Error::InvalidSchema(format!(
                                    "foreign key column not found: {}.{}.{}",
                                    db_schema.name, table.name, column
                                )));
                            }
                        }

                        let ref_columns = catalog
                            .get(&fk.referenced_schema.to_lowercase())
                            .and_then(|tables| tables.get(&fk.referenced_table.to_lowercase()))
                            .ok_or_else(|| {
                                Error::InvalidSchema(format!(
                                    "referenced table not found: {}.{}",
                                    fk.referenced_schema, fk.referenced_table
                                ))
                            })?;

                        for column in &fk.referenced_columns {
                            if !ref_columns.contains(&column.to_lowercase()) {
                                return Err(Error::InvalidSchema(format!(
                                    "referenced column not found: {}.{}.{}",
                                    fk.referenced_schema, fk.referenced_table, column
                                )));
                            }
                        }
                    }
                    Constraint::Unique(unique) => {
                        for column in &unique.columns {
                            if !columns.contains(&column.to_lowercase()) {
                                return Err(Error::InvalidSchema(format!(
                                    "unique column not found: {}.{}.{}",
                                    db_schema.name, table.name, column
                                )));
                            }
                        }
                    }
                    Constraint::Check(_) => {}
                }
            }
        }
    }

    Ok(())
}
