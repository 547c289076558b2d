pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m020260412_000001_initial_tables;
mod m020260530_000001_analytics_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m020260412_000001_initial_tables::Migration),
            Box::new(m020260530_000001_analytics_indexes::Migration),
        ]
    }
}
