use sea_orm::DatabaseConnection;

use super::TaskDao;

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn task(&self) -> TaskDao {
        TaskDao::new(&self.db)
    }
}
