pub use sea_orm_migration::prelude::*;

mod m20250602_000001_initial;
mod m20250615_000001_add_winners;
mod m20250623_000001_add_flow_sessions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250602_000001_initial::Migration),
            Box::new(m20250615_000001_add_winners::Migration),
            Box::new(m20250623_000001_add_flow_sessions::Migration),
        ]
    }
}
