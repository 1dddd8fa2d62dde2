//! Reqwest-backed Firestore user record store.
//!
//! This adapter owns transport details only: document URLs, preconditions and
//! update masks, HTTP error mapping, and typed-value encoding.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use tracing::debug;

use super::dto::{
    DocumentDto, NUMBER_OF_RENTS, RECENTLY_ACTIVE, TOTAL_AVERAGE_WEIGHT_RATINGS, UPDATED_AT,
    ValueDto, error_status,
};
use crate::domain::ports::{UserRecordRepository, UserRecordRepositoryError};
use crate::domain::{RentalStats, UserId, UserRecord, epoch_millis};

/// Collection holding one document per user.
pub const USERS_COLLECTION: &str = "USERS";

/// Public Firestore REST endpoint.
pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1/";

const DEFAULT_DATABASE: &str = "(default)";

/// Connection settings for [`FirestoreUserRecordRepository`].
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// REST root, e.g. the public endpoint or `http://localhost:8080/v1/`
    /// for the emulator.
    pub base_url: Url,
    pub project_id: String,
    /// OAuth bearer token sent with every request, when set.
    pub access_token: Option<String>,
    pub timeout: Duration,
}

/// Errors raised while constructing the adapter.
#[derive(Debug, thiserror::Error)]
pub enum FirestoreSetupError {
    #[error("firestore base URL {url} cannot carry a document path")]
    InvalidBaseUrl { url: String },
    #[error("firestore project id must not be empty")]
    EmptyProjectId,
    #[error("failed to build firestore HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Firestore adapter that performs document reads and writes over REST.
pub struct FirestoreUserRecordRepository {
    client: Client,
    documents_root: Url,
    access_token: Option<String>,
    clock: Arc<dyn Clock>,
}

impl FirestoreUserRecordRepository {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL cannot hold a path, the project id
    /// is blank, or the reqwest client cannot be constructed.
    pub fn new(config: FirestoreConfig, clock: Arc<dyn Clock>) -> Result<Self, FirestoreSetupError> {
        let FirestoreConfig {
            base_url,
            project_id,
            access_token,
            timeout,
        } = config;

        if project_id.trim().is_empty() {
            return Err(FirestoreSetupError::EmptyProjectId);
        }

        let mut documents_root = base_url.clone();
        documents_root
            .path_segments_mut()
            .map_err(|()| FirestoreSetupError::InvalidBaseUrl {
                url: base_url.to_string(),
            })?
            .pop_if_empty()
            .extend([
                "projects",
                project_id.as_str(),
                "databases",
                DEFAULT_DATABASE,
                "documents",
                USERS_COLLECTION,
            ]);

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            documents_root,
            access_token,
            clock,
        })
    }

    fn document_url(&self, user_id: &UserId) -> Result<Url, UserRecordRepositoryError> {
        let mut url = self.documents_root.clone();
        url.path_segments_mut()
            .map_err(|()| UserRecordRepositoryError::query("document root cannot carry a path"))?
            .push(user_id.as_ref());
        Ok(url)
    }

    fn authorised(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.access_token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(
        &self,
        builder: RequestBuilder,
    ) -> Result<(StatusCode, Vec<u8>), UserRecordRepositoryError> {
        let response = self
            .authorised(builder)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        Ok((status, body.to_vec()))
    }

    async fn patch(
        &self,
        url: Url,
        document: &DocumentDto,
    ) -> Result<(StatusCode, Vec<u8>), UserRecordRepositoryError> {
        debug!(url = %url, "patching firestore document");
        self.send(self.client.patch(url).json(document)).await
    }
}

#[async_trait]
impl UserRecordRepository for FirestoreUserRecordRepository {
    async fn get(&self, user_id: &UserId) -> Result<Option<UserRecord>, UserRecordRepositoryError> {
        let url = self.document_url(user_id)?;
        let (status, body) = self.send(self.client.get(url)).await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        parse_record(&body, user_id).map(Some)
    }

    async fn create(
        &self,
        user_id: &UserId,
        stats: &RentalStats,
    ) -> Result<UserRecord, UserRecordRepositoryError> {
        let record = UserRecord::created(user_id.clone(), *stats, epoch_millis(self.clock.as_ref()));
        let mut url = self.document_url(user_id)?;
        url.query_pairs_mut()
            .append_pair("currentDocument.exists", "false");

        let (status, body) = self.patch(url, &DocumentDto::from_record(&record)).await?;
        if status.is_success() {
            return Ok(record);
        }
        if status == StatusCode::CONFLICT
            || matches_status(&body, &["ALREADY_EXISTS", "FAILED_PRECONDITION"])
        {
            return Err(UserRecordRepositoryError::already_exists(user_id.as_ref()));
        }
        Err(map_status_error(status, &body))
    }

    async fn merge(
        &self,
        user_id: &UserId,
        stats: &RentalStats,
    ) -> Result<UserRecord, UserRecordRepositoryError> {
        let now = epoch_millis(self.clock.as_ref());
        let document = DocumentDto::default()
            .with_field(
                TOTAL_AVERAGE_WEIGHT_RATINGS,
                ValueDto::double(stats.total_average_weight_ratings()),
            )
            .with_field(NUMBER_OF_RENTS, ValueDto::integer(stats.number_of_rents()))
            .with_field(UPDATED_AT, ValueDto::integer(now))
            .with_field(RECENTLY_ACTIVE, ValueDto::integer(now));
        let url = with_update_mask(
            self.document_url(user_id)?,
            &[TOTAL_AVERAGE_WEIGHT_RATINGS, NUMBER_OF_RENTS, UPDATED_AT, RECENTLY_ACTIVE],
        );

        let (status, body) = self.patch(url, &document).await?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }

        self.get(user_id)
            .await?
            .ok_or_else(|| UserRecordRepositoryError::vanished(user_id.as_ref()))
    }

    async fn touch_activity(&self, user_id: &UserId) -> Result<(), UserRecordRepositoryError> {
        let now = epoch_millis(self.clock.as_ref());
        let document = DocumentDto::default()
            .with_field(RECENTLY_ACTIVE, ValueDto::integer(now))
            .with_field(UPDATED_AT, ValueDto::integer(now));
        let mut url = with_update_mask(self.document_url(user_id)?, &[RECENTLY_ACTIVE, UPDATED_AT]);
        url.query_pairs_mut()
            .append_pair("currentDocument.exists", "true");

        let (status, body) = self.patch(url, &document).await?;
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND
            || matches_status(&body, &["NOT_FOUND", "FAILED_PRECONDITION"])
        {
            return Err(UserRecordRepositoryError::missing(user_id.as_ref()));
        }
        Err(map_status_error(status, &body))
    }
}

// `createdAt` is never part of a mask, so merges cannot rewrite it.
fn with_update_mask(mut url: Url, fields: &[&str]) -> Url {
    {
        let mut pairs = url.query_pairs_mut();
        for field in fields {
            pairs.append_pair("updateMask.fieldPaths", field);
        }
    }
    url
}

fn parse_record(body: &[u8], user_id: &UserId) -> Result<UserRecord, UserRecordRepositoryError> {
    let document: DocumentDto = serde_json::from_slice(body).map_err(|error| {
        UserRecordRepositoryError::query(format!("invalid firestore document payload: {error}"))
    })?;
    document
        .into_record(user_id.clone())
        .map_err(UserRecordRepositoryError::query)
}

fn matches_status(body: &[u8], names: &[&str]) -> bool {
    error_status(body).is_some_and(|status| names.contains(&status.as_str()))
}

fn map_transport_error(error: reqwest::Error) -> UserRecordRepositoryError {
    UserRecordRepositoryError::connection(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> UserRecordRepositoryError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            UserRecordRepositoryError::connection(message)
        }
        _ => UserRecordRepositoryError::query(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
