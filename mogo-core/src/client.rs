//! The database handle models are read and written through.

use std::collections::HashSet;
use std::sync::Arc;

use bson::{Document, doc};
use mongodb::{Client, Collection, Database};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::MogoConfig;
use crate::document::IntoObjectId;
use crate::error::{MogoError, MogoResult};
use crate::index::Index;
use crate::model::Model;
use crate::query::Query;

/// A collection name with the index set ensured on it.
type EnsuredKey = (String, Vec<Index>);

/// A handle on one database.
///
/// The driver pools connections internally, so the handle is cheap to clone
/// and share between tasks. Clones share the record of which index sets
/// were already ensured on which collections.
#[derive(Clone)]
pub struct Db {
    client: Client,
    database: Database,
    config: Arc<MogoConfig>,
    ensured: Arc<Mutex<HashSet<EnsuredKey>>>,
}

impl Db {
    /// Connect using a URI that names the database, such as
    /// `127.0.0.1:27017/test` or `mongodb://host/app?replicaSet=rs0`.
    pub async fn connect(uri: &str) -> MogoResult<Self> {
        Self::new(MogoConfig::from_uri(uri)?).await
    }

    /// Create a handle from configuration.
    ///
    /// Connections are established lazily; use [`Db::ping`] to check the
    /// server is reachable.
    pub async fn new(config: MogoConfig) -> MogoResult<Self> {
        let options = config.to_client_options().await?;
        let client = Client::with_options(options)?;
        let database = client.database(&config.database);

        info!(
            uri = %config.uri,
            database = %config.database,
            "mogo database handle created"
        );

        Ok(Self {
            client,
            database,
            config: Arc::new(config),
            ensured: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    /// Release this handle. The pool closes once every clone is dropped.
    pub fn close(self) {
        info!(database = %self.config.database, "mogo database handle closed");
    }

    /// Get the configuration.
    pub fn config(&self) -> &MogoConfig {
        &self.config
    }

    /// Get the underlying driver database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Get the underlying driver client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Ping the server.
    pub async fn ping(&self) -> MogoResult<()> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    /// Check if the server answers a ping.
    pub async fn is_healthy(&self) -> bool {
        self.ping().await.is_ok()
    }

    /// Get the typed collection for a model, ensuring its declared indexes
    /// the first time it is requested.
    ///
    /// Models sharing a collection each get their own indexes ensured.
    pub async fn collection<T: Model>(&self) -> MogoResult<Collection<T>> {
        let key: EnsuredKey = (T::collection_name(), T::indexes());
        let collection = self.database.collection::<T>(&key.0);

        if self.ensured.lock().contains(&key) {
            return Ok(collection);
        }

        let indexes = key
            .1
            .iter()
            .map(|index| index.to_index_model())
            .collect::<MogoResult<Vec<_>>>()?;
        if !indexes.is_empty() {
            debug!(collection = %key.0, count = indexes.len(), "Ensuring indexes");
            collection.create_indexes(indexes, None).await?;
        }

        self.ensured.lock().insert(key);
        Ok(collection)
    }

    /// Drop a model's collection.
    pub async fn drop_collection<T: Model>(&self) -> MogoResult<()> {
        let name = T::collection_name();
        debug!(collection = %name, "Dropping collection");

        self.database
            .collection::<Document>(&name)
            .drop(None)
            .await?;
        self.ensured.lock().retain(|(ensured, _)| *ensured != name);
        Ok(())
    }

    /// Fetch a model by id. The id may be an [`ObjectId`](bson::oid::ObjectId)
    /// or its hex string.
    pub async fn get<T: Model>(&self, id: impl IntoObjectId) -> MogoResult<T> {
        let id = id.into_object_id()?;
        let collection = self.collection::<T>().await?;
        debug!(collection = %T::collection_name(), %id, "Fetching document");

        collection
            .find_one(doc! { "_id": id }, None)
            .await?
            .ok_or_else(|| MogoError::not_found(format!("{} {}", T::collection_name(), id)))
    }

    /// Insert a model, assigning a fresh id first when it has none, and
    /// return the `_id` the document was stored under.
    ///
    /// A model without an id field is stored under an id the driver picks.
    pub async fn create<T: Model>(&self, model: &mut T) -> MogoResult<bson::oid::ObjectId> {
        let collection = self.collection::<T>().await?;

        if model.id().is_none() {
            model.set_id(bson::oid::ObjectId::new());
        }
        debug!(collection = %T::collection_name(), id = ?model.id(), "Inserting document");

        let result = collection.insert_one(&*model, None).await?;
        result.inserted_id.as_object_id().ok_or_else(|| {
            MogoError::invalid_object_id(format!(
                "{} stored non-ObjectId _id {}",
                T::collection_name(),
                result.inserted_id
            ))
        })
    }

    /// Replace the stored document with the model, then reload the model
    /// from what the server stored.
    pub async fn update<T: Model>(&self, model: &mut T) -> MogoResult<()> {
        let id = model
            .id()
            .ok_or_else(|| MogoError::missing_id(T::collection_name()))?;
        let collection = self.collection::<T>().await?;
        debug!(collection = %T::collection_name(), %id, "Replacing document");

        let result = collection
            .replace_one(doc! { "_id": id }, &*model, None)
            .await?;
        if result.matched_count == 0 {
            warn!(collection = %T::collection_name(), %id, "Update matched no document");
            return Err(MogoError::not_found(format!(
                "{} {}",
                T::collection_name(),
                id
            )));
        }

        *model = self.get(id).await?;
        Ok(())
    }

    /// Delete a model's stored document.
    pub async fn delete<T: Model>(&self, model: &T) -> MogoResult<()> {
        let id = model
            .id()
            .ok_or_else(|| MogoError::missing_id(T::collection_name()))?;
        let collection = self.collection::<T>().await?;
        debug!(collection = %T::collection_name(), %id, "Deleting document");

        let result = collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            warn!(collection = %T::collection_name(), %id, "Delete matched no document");
            return Err(MogoError::not_found(format!(
                "{} {}",
                T::collection_name(),
                id
            )));
        }
        Ok(())
    }

    /// Start a query with a filter.
    pub fn where_(&self, filter: impl Into<Document>) -> Query<'_> {
        Query::new(self).or(filter)
    }

    /// Start a query matching every document.
    pub fn query(&self) -> Query<'_> {
        Query::new(self)
    }

    #[cfg(test)]
    pub(crate) fn is_ensured<T: Model>(&self) -> bool {
        self.ensured
            .lock()
            .contains(&(T::collection_name(), T::indexes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{TestCollection, UserAccount};
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    /// Shares `TestCollection`'s collection but declares an index.
    #[derive(Debug, Serialize, Deserialize)]
    struct LegacyTestView {
        #[serde(rename = "_id")]
        id: bson::oid::ObjectId,
        test_field_1: String,
    }

    impl Model for LegacyTestView {
        fn collection_name() -> String {
            "test".to_string()
        }

        fn indexes() -> Vec<Index> {
            vec![Index::new(["test_field_1"]).unique()]
        }

        fn id(&self) -> Option<bson::oid::ObjectId> {
            Some(self.id)
        }

        fn set_id(&mut self, id: bson::oid::ObjectId) {
            self.id = id;
        }
    }

    async fn lazy_db() -> Db {
        Db::connect("127.0.0.1:27017/mogo_unit").await.unwrap()
    }

    #[tokio::test]
    async fn test_connect_is_lazy() {
        let db = lazy_db().await;
        assert_eq!(db.config().database, "mogo_unit");
        assert_eq!(db.database().name(), "mogo_unit");
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_uri() {
        let err = Db::connect("127.0.0.1:27017").await.err().unwrap();
        assert!(matches!(err, MogoError::InvalidUri(_)));
    }

    #[tokio::test]
    async fn test_collection_without_indexes_needs_no_server() {
        let db = lazy_db().await;
        let collection = db.collection::<TestCollection>().await.unwrap();
        assert_eq!(collection.name(), "test");
        assert!(db.is_ensured::<TestCollection>());
        assert!(!db.is_ensured::<UserAccount>());
    }

    #[tokio::test]
    async fn test_shared_collection_tracks_indexes_per_model() {
        let db = lazy_db().await;
        db.collection::<TestCollection>().await.unwrap();
        assert!(db.is_ensured::<TestCollection>());
        assert!(!db.is_ensured::<LegacyTestView>());
    }

    #[tokio::test]
    async fn test_shared_collection_still_creates_indexes() {
        let config = MogoConfig::builder()
            .uri("mongodb://127.0.0.1:1/mogo_unit")
            .server_selection_timeout(Duration::from_millis(200))
            .connect_timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let db = Db::new(config).await.unwrap();

        db.collection::<TestCollection>().await.unwrap();
        let err = db.collection::<LegacyTestView>().await.unwrap_err();
        assert!(matches!(err, MogoError::Driver(_)));
        assert!(!db.is_ensured::<LegacyTestView>());
    }

    #[tokio::test]
    async fn test_update_requires_id() {
        let db = lazy_db().await;
        let mut record = TestCollection::default();
        let err = db.update(&mut record).await.unwrap_err();
        assert!(err.is_missing_id());

        let err = db.delete(&record).await.unwrap_err();
        assert!(err.is_missing_id());
    }

    #[tokio::test]
    async fn test_get_rejects_bad_hex() {
        let db = lazy_db().await;
        let err = db.get::<UserAccount>("xyz").await.unwrap_err();
        assert!(matches!(err, MogoError::InvalidObjectId(_)));
    }

    #[tokio::test]
    async fn test_clones_share_ensured_set() {
        let db = lazy_db().await;
        let clone = db.clone();
        clone.collection::<TestCollection>().await.unwrap();
        assert!(db.is_ensured::<TestCollection>());
    }
}
