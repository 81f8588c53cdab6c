use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::options::{
    ClientOptions, FindOneAndReplaceOptions, FindOneAndUpdateOptions, FindOptions, IndexOptions,
    ReturnDocument, ServerApi, ServerApiVersion,
};
use mongodb::{Client, Collection, IndexModel};

use crate::models::{ApiError, BusinessUrl, ReviewBatch, Source, User, Widget, WidgetConfig};
use crate::traits::Store;

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    err.to_string().contains("E11000 duplicate key error")
}

#[derive(Clone)]
pub struct MongoDBService {
    users: Collection<User>,
    business_urls: Collection<BusinessUrl>,
    review_batches: Collection<ReviewBatch>,
    widgets: Collection<Widget>,
}

impl MongoDBService {
    pub async fn init(uri: &str, database: &str) -> Result<Self, mongodb::error::Error> {
        let mut client_options = ClientOptions::parse(uri).await?;

        let server_api = ServerApi::builder()
            .version(ServerApiVersion::V1)
            .strict(true)
            .deprecation_errors(true)
            .build();
        client_options.server_api = Some(server_api);
        client_options.connect_timeout = Some(std::time::Duration::from_secs(10));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        client
            .database("admin")
            .run_command(doc! {"ping": 1}, None)
            .await?;

        log::info!("Connected to MongoDB, using database {}", database);

        let db = client.database(database);
        let users = db.collection::<User>("users");
        let business_urls = db.collection::<BusinessUrl>("business_urls");
        let review_batches = db.collection::<ReviewBatch>("review_batches");
        let widgets = db.collection::<Widget>("widgets");

        let unique = || IndexOptions::builder().unique(true).build();

        let email_model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(unique())
            .build();
        users.create_index(email_model, None).await?;

        // One registration per URL per source, across all users
        let url_hash_model = IndexModel::builder()
            .keys(doc! { "urlHash": 1, "source": 1 })
            .options(unique())
            .build();
        business_urls.create_index(url_hash_model, None).await?;

        let owner_model = IndexModel::builder()
            .keys(doc! { "userId": 1, "addedAt": -1 })
            .build();
        business_urls.create_index(owner_model, None).await?;

        let batch_model = IndexModel::builder()
            .keys(doc! { "businessUrlId": 1, "source": 1 })
            .options(unique())
            .build();
        review_batches.create_index(batch_model, None).await?;

        let widget_owner_model = IndexModel::builder()
            .keys(doc! { "userId": 1, "createdAt": -1 })
            .build();
        widgets.create_index(widget_owner_model, None).await?;

        Ok(Self { users, business_urls, review_batches, widgets })
    }
}

#[async_trait]
impl Store for MongoDBService {
    async fn create_user(&self, user: User) -> Result<User, ApiError> {
        if self.find_user_by_email(&user.email).await?.is_some() {
            return Err(ApiError::Conflict("An account with this email already exists".to_string()));
        }

        match self.users.insert_one(&user, None).await {
            Ok(_) => Ok(user),
            Err(e) if is_duplicate_key(&e) => {
                Err(ApiError::Conflict("An account with this email already exists".to_string()))
            }
            Err(e) => Err(ApiError::DatabaseError(e)),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        self.users
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn find_user_by_id(&self, id: &ObjectId) -> Result<Option<User>, ApiError> {
        self.users
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn create_business_url(&self, business: BusinessUrl) -> Result<BusinessUrl, ApiError> {
        let existing = self
            .business_urls
            .find_one(doc! { "urlHash": &business.url_hash, "source": business.source.as_str() }, None)
            .await?;
        if existing.is_some() {
            return Err(ApiError::Conflict("This business URL has already been added".to_string()));
        }

        // The unique index still catches two concurrent inserts of the same URL
        match self.business_urls.insert_one(&business, None).await {
            Ok(_) => Ok(business),
            Err(e) if is_duplicate_key(&e) => {
                Err(ApiError::Conflict("This business URL has already been added".to_string()))
            }
            Err(e) => Err(ApiError::DatabaseError(e)),
        }
    }

    async fn find_business_url(&self, id: &ObjectId) -> Result<Option<BusinessUrl>, ApiError> {
        self.business_urls
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn list_business_urls(&self, user_id: &ObjectId) -> Result<Vec<BusinessUrl>, ApiError> {
        let options = FindOptions::builder().sort(doc! { "addedAt": -1 }).build();
        self.business_urls
            .find(doc! { "userId": user_id }, options)
            .await?
            .try_collect()
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn mark_business_url_scraped(&self, id: &ObjectId, at: DateTime<Utc>) -> Result<(), ApiError> {
        self.business_urls
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "lastScrapedAt": bson::DateTime::from_chrono(at) } },
                None,
            )
            .await?;
        Ok(())
    }

    async fn upsert_review_batch(&self, batch: ReviewBatch) -> Result<ReviewBatch, ApiError> {
        let filter = doc! {
            "businessUrlId": batch.business_url_id,
            "source": batch.source.as_str(),
        };
        let options = FindOneAndReplaceOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        // Replacement keeps the existing _id; reviews are never merged
        let replacement = ReviewBatch { id: None, ..batch };
        self.review_batches
            .find_one_and_replace(filter, replacement, options)
            .await?
            .ok_or_else(|| ApiError::InternalError("Review batch upsert returned no document".to_string()))
    }

    async fn find_review_batch(&self, business_url_id: &ObjectId, source: Source) -> Result<Option<ReviewBatch>, ApiError> {
        self.review_batches
            .find_one(doc! { "businessUrlId": business_url_id, "source": source.as_str() }, None)
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn list_review_batches(&self, business_url_ids: &[ObjectId]) -> Result<Vec<ReviewBatch>, ApiError> {
        if business_url_ids.is_empty() {
            return Ok(Vec::new());
        }
        let options = FindOptions::builder().sort(doc! { "lastScrapedAt": -1 }).build();
        self.review_batches
            .find(doc! { "businessUrlId": { "$in": business_url_ids } }, options)
            .await?
            .try_collect()
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn create_widget(&self, widget: Widget) -> Result<Widget, ApiError> {
        self.widgets.insert_one(&widget, None).await?;
        Ok(widget)
    }

    async fn find_widget(&self, id: &ObjectId) -> Result<Option<Widget>, ApiError> {
        self.widgets
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn list_widgets(&self, user_id: &ObjectId) -> Result<Vec<Widget>, ApiError> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        self.widgets
            .find(doc! { "userId": user_id }, options)
            .await?
            .try_collect()
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn update_widget(&self, id: &ObjectId, name: &str, config: &WidgetConfig) -> Result<Option<Widget>, ApiError> {
        let settings = bson::to_bson(&config.settings)
            .map_err(|e| ApiError::InternalError(format!("Failed to encode widget settings: {}", e)))?;
        let update = doc! {
            "$set": {
                "name": name,
                "businessUrlId": config.business_url_id,
                "maxReviews": config.max_reviews,
                "minRating": config.min_rating,
                "settings": settings,
                "updatedAt": bson::DateTime::from_chrono(Utc::now()),
            }
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.widgets
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn delete_widget(&self, id: &ObjectId) -> Result<bool, ApiError> {
        let result = self.widgets.delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn increment_widget_views(&self, id: &ObjectId) -> Result<Option<Widget>, ApiError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.widgets
            .find_one_and_update(doc! { "_id": id }, doc! { "$inc": { "views": 1_i64 } }, options)
            .await
            .map_err(ApiError::DatabaseError)
    }
}
