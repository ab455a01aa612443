use common::{Now, UuidGenerator};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DBClient,
    error::{Error, not_found},
    handler::Handler,
    models::Category,
};

impl<D, U, N> Handler<D, U, N>
where
    D: DBClient,
    U: UuidGenerator,
    N: Now,
{
    /// # Errors
    /// - category not found
    /// - database error
    #[instrument(skip(self), err)]
    pub async fn get_category(&self, id: Uuid) -> Result<Category, Error> {
        self.db
            .get_category(id)
            .await
            .map_err(not_found(Error::CategoryNotFound(id)))
    }

    /// Lists all categories ordered by path, so children follow their parent.
    ///
    /// # Errors
    /// - database error
    #[instrument(skip(self), err)]
    pub async fn list_categories(&self) -> Result<Vec<Category>, Error> {
        Ok(self.db.list_categories().await?)
    }

    /// Lists the direct children of a category.
    ///
    /// # Errors
    /// - parent category not found
    /// - database error
    #[instrument(skip(self), err)]
    pub async fn list_child_categories(&self, parent_id: Uuid) -> Result<Vec<Category>, Error> {
        self.get_category(parent_id).await?;
        Ok(self.db.list_child_categories(parent_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{category_id, fixture_category, fixture_db, fixture_shop};
    use http::StatusCode;
    use rstest::rstest;
    use testutils::assert_result;

    fn fixture_child() -> Category {
        fixture_category(|c| {
            c.id = Uuid::from_u128(0x23);
            c.name = "Phones".to_string();
            c.parent_id = Some(category_id());
            c.level = 1;
            c.path = "/Electronics/Phones".to_string();
        })
    }

    #[rstest]
    #[case::happy_path(category_id(), Ok(fixture_category(|_| {})))]
    #[case::not_found(Uuid::from_u128(404), Err(StatusCode::NOT_FOUND))]
    #[tokio::test]
    async fn test_get_category(#[case] id: Uuid, #[case] want: Result<Category, StatusCode>) {
        // given
        let shop = fixture_shop(fixture_db());

        // when
        let got = shop.handler.get_category(id).await;

        // then
        assert_result(got, want);
    }

    #[tokio::test]
    async fn test_list_categories_orders_by_path() {
        // given
        let books = fixture_category(|c| {
            c.id = Uuid::from_u128(0x24);
            c.name = "Books".to_string();
            c.path = "/Books".to_string();
        });
        let db = fixture_db()
            .with_category(fixture_child())
            .with_category(books.clone());
        let shop = fixture_shop(db);

        // when
        let got = shop.handler.list_categories().await.unwrap();

        // then
        assert_eq!(got, vec![books, fixture_category(|_| {}), fixture_child()]);
    }

    #[rstest]
    #[case::with_children(category_id(), Ok(vec![fixture_child()]))]
    #[case::leaf(Uuid::from_u128(0x23), Ok(vec![]))]
    #[case::unknown_parent(Uuid::from_u128(404), Err(StatusCode::NOT_FOUND))]
    #[tokio::test]
    async fn test_list_child_categories(
        #[case] parent_id: Uuid,
        #[case] want: Result<Vec<Category>, StatusCode>,
    ) {
        // given
        let shop = fixture_shop(fixture_db().with_category(fixture_child()));

        // when
        let got = shop.handler.list_child_categories(parent_id).await;

        // then
        assert_result(got, want);
    }
}
