use common::{Now, UuidGenerator};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DBClient,
    error::{Error, not_found},
    handler::Handler,
    models::Category,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCategoryReq {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

impl<D, U, N> Handler<D, U, N>
where
    D: DBClient,
    U: UuidGenerator,
    N: Now,
{
    /// Creates a category, optionally below an existing parent.
    ///
    /// # Errors
    /// - name is empty
    /// - parent category not found
    /// - database error
    #[instrument(skip_all, fields(category_id), err)]
    pub async fn create_category(&self, req: CreateCategoryReq) -> Result<Category, Error> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(Error::MissingName);
        }

        let (level, path) = match req.parent_id {
            Some(parent_id) => {
                let parent = self
                    .db
                    .get_category(parent_id)
                    .await
                    .map_err(not_found(Error::CategoryNotFound(parent_id)))?;
                (parent.level + 1, format!("{}/{name}", parent.path))
            }
            None => (0, format!("/{name}")),
        };

        let id = self.uuid.generate();
        tracing::Span::current().record("category_id", id.to_string());

        let now = N::now();
        let category = Category {
            id,
            name: name.to_string(),
            description: req.description,
            parent_id: req.parent_id,
            level,
            path,
            created_at: now,
            updated_at: now,
        };

        self.db.insert_category(&category).await?;

        Ok(category)
    }
}
