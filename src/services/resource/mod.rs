//! Resource catalog service.
//!
//! Resources are managed outside the scheduling grid; the grid only reads
//! them through [`ResourceCatalog`]. Creation is here for seeding and tests.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::resource::{Resource, ResourceCategory, WorkingHours};
use crate::services::store::{ResourceCatalog, StoreError};

/// Service for reading and seeding bookable resources.
pub struct ResourceService<'a> {
    conn: &'a Connection,
}

impl<'a> ResourceService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a resource. The `id` field of `resource` is ignored.
    pub fn create(&self, resource: &Resource) -> Result<Resource> {
        resource.validate().map_err(|e| anyhow!("{}", e))?;

        let (open, close) = match resource.working_hours {
            Some(hours) => (Some(hours.open), Some(hours.close)),
            None => (None, None),
        };
        let sort_order: i64 = self
            .conn
            .query_row("SELECT COALESCE(MAX(sort_order), 0) + 1 FROM resources", [], |row| {
                row.get(0)
            })
            .context("Failed to compute resource order")?;

        self.conn
            .execute(
                "INSERT INTO resources (name, category, open_time, close_time, sort_order)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    resource.name.trim(),
                    resource.category.as_str(),
                    open,
                    close,
                    sort_order,
                ],
            )
            .context("Failed to insert resource")?;

        let id = self.conn.last_insert_rowid();
        self.get_by_id(id)?
            .ok_or_else(|| anyhow!("Resource {} vanished after insert", id))
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Resource>> {
        self.conn
            .query_row(
                "SELECT id, name, category, open_time, close_time FROM resources WHERE id = ?1",
                params![id],
                map_resource_row,
            )
            .optional()
            .context("Failed to load resource")
    }

    /// Resources of one category in display order.
    pub fn list_by_type(&self, category: ResourceCategory) -> Result<Vec<Resource>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, category, open_time, close_time FROM resources
             WHERE category = ?1
             ORDER BY sort_order ASC, id ASC",
        )?;

        let resources = stmt
            .query_map([category.as_str()], map_resource_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list resources")?;

        Ok(resources)
    }

    pub fn list_all(&self) -> Result<Vec<Resource>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, category, open_time, close_time FROM resources
             ORDER BY sort_order ASC, id ASC",
        )?;

        let resources = stmt
            .query_map([], map_resource_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(resources)
    }
}

impl ResourceCatalog for ResourceService<'_> {
    fn list_resources_by_type(&self, category: ResourceCategory) -> Result<Vec<Resource>, StoreError> {
        Ok(self.list_by_type(category)?)
    }
}

fn map_resource_row(row: &Row<'_>) -> rusqlite::Result<Resource> {
    let raw_category: String = row.get(2)?;
    let category = ResourceCategory::parse(&raw_category).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown resource category '{}'", raw_category).into(),
        )
    })?;

    let open: Option<NaiveTime> = row.get(3)?;
    let close: Option<NaiveTime> = row.get(4)?;
    let working_hours = match (open, close) {
        (Some(open), Some(close)) => Some(WorkingHours::new(open, close)),
        _ => None,
    };

    Ok(Resource {
        id: row.get(0)?,
        name: row.get(1)?,
        category,
        working_hours,
    })
}
