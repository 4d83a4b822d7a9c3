use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202605100001_create_tickets::Migration),
            Box::new(migrations::m202605100002_create_messages::Migration),
        ]
    }
}
