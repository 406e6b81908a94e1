pub mod api;
pub mod filter;
pub mod id;
pub mod models;
pub mod parse;
pub mod preferences;
pub mod search;
pub mod session;
pub mod store;
pub mod validation;

use std::{collections::HashSet, fs, io, path::PathBuf};

use api::ApiClient;
use filter::SortMode;
use models::{LoginRequest, ModelKind, Work, WorkId};
use parse::ParseError;
use preferences::PreferenceStore;
use search::Query;
use serde::{Deserialize, Serialize};
use session::Session;
use sqlx::migrate::MigrateError;
use store::{KeyValueStore, SqliteStore};
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_CONFIG: &str = include_str!("../../default_config.toml");

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub database_path: PathBuf,
    pub api_url: Url,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Config {
    pub fn expand_paths(&mut self) -> Result<(), Error> {
        self.database_path = PathBuf::from(
            shellexpand::full(&self.database_path.to_string_lossy())
                .map_err(|_| Error::Expansion(self.database_path.to_string_lossy().to_string()))?
                .to_string(),
        );

        Ok(())
    }
}

/// Which works to show and in what order.
#[derive(Debug, Default, Clone)]
pub struct Browse {
    /// Plain substring matched against title, description and author.
    pub text: Option<String>,
    pub query: Option<Query>,
    pub tags: HashSet<String>,
    pub sort: Option<SortMode>,
    pub limit: Option<usize>,
}

pub struct Home {
    pub newest: Vec<Work>,
    pub top_rated: Vec<Work>,
}

/// Everything a front end needs: the API client, the local preferences and
/// the session of the signed in user, if any.
pub struct Portal<S = SqliteStore> {
    pub config: Config,
    pub api: ApiClient,
    pub preferences: PreferenceStore<S>,
    session: Option<Session>,
}

impl Portal<SqliteStore> {
    pub async fn from_path(config_path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = config_path.into();

        info!("Loading config from {path:?}");

        let text = fs::read_to_string(&path)?;

        let mut config: Config = toml::from_str(&text)?;

        config.expand_paths()?;

        debug!("Loaded config: {config:?}");

        let store = SqliteStore::open(&config.database_path).await?;

        Portal::new(config, store)
    }
}

impl<S: KeyValueStore> Portal<S> {
    pub fn new(config: Config, store: S) -> Result<Self, Error> {
        let api = ApiClient::new(config.api_url.clone(), config.accept_invalid_certs)?;

        Ok(Self {
            config,
            api,
            preferences: PreferenceStore::new(store),
            session: None,
        })
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
    }

    /// The current session, or [`Error::Unauthorized`] when signed out.
    pub fn require_session(&self) -> Result<&Session, Error> {
        self.session.as_ref().ok_or(Error::Unauthorized)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, Error> {
        let response = self
            .api
            .login(&LoginRequest {
                email: email.trim().to_lowercase(),
                password: password.to_owned(),
            })
            .await?;

        Ok(self.session.insert(response.into()))
    }

    /// Forgets the session and the bookmarks of the signed out user.
    pub async fn logout(&mut self) -> Result<(), Error> {
        self.session = None;
        self.preferences.clear_bookmarks().await
    }

    /// Drops the session when the API rejected it, then passes `result` on.
    /// Bookmarks belong to the local profile and are kept.
    pub fn check<T>(&mut self, result: Result<T, Error>) -> Result<T, Error> {
        if let Err(Error::Unauthorized) = &result {
            if self.session.take().is_some() {
                warn!("Session was rejected by the API, signing out");
            }
        }

        result
    }

    pub async fn works(&mut self) -> Result<Vec<Work>, Error> {
        let result = self.api.works(self.session.as_ref()).await;

        self.check(result)
    }

    /// Fetches a single work, filling in the aggregate rating from the
    /// ratings endpoints when the work came without one.
    pub async fn work(&mut self, id: WorkId) -> Result<Work, Error> {
        let result = self.api.work(self.session.as_ref(), id).await;
        let mut work = self.check(result)?;

        if work.average_rating.is_none() {
            let result = self.api.rating_count(self.session.as_ref(), id).await;
            let count = self.check(result)?;

            if count > 0 {
                let result = self.api.average_rating(self.session.as_ref(), id).await;
                work.average_rating = Some(self.check(result)?);
            }

            work.rating_count = Some(count);
        }

        Ok(work)
    }

    /// Fetches every work and applies `browse` to it.
    pub async fn browse(&mut self, browse: &Browse) -> Result<Vec<Work>, Error> {
        let mut works = self.works().await?;

        if let Some(text) = &browse.text {
            works = filter::filter_by_text(works, text);
        }
        if let Some(query) = &browse.query {
            works = query.filter(works);
        }

        works = filter::filter_by_tags(works, &browse.tags);

        if let Some(sort) = browse.sort {
            let ratings = self.preferences.ratings().await?;
            works = filter::sort_works(works, sort, |work| {
                ratings.get(&work.id).copied().unwrap_or_default().into()
            });
        }

        if let Some(limit) = browse.limit {
            works.truncate(limit);
        }

        Ok(works)
    }

    /// The newest and the best rated works, rated by the local profile.
    pub async fn home(&mut self) -> Result<Home, Error> {
        let works = self.works().await?;
        let ratings = self.preferences.ratings().await?;
        let rating = |work: &Work| f64::from(ratings.get(&work.id).copied().unwrap_or_default());

        Ok(Home {
            newest: filter::preview(works.clone(), SortMode::Newest, rating),
            top_rated: filter::preview(works, SortMode::TopRated, rating),
        })
    }

    pub async fn bookmarked_works(&mut self) -> Result<Vec<Work>, Error> {
        let works = self.works().await?;
        let bookmarks = self.preferences.bookmarks().await?;

        Ok(filter::bookmarked(works, &bookmarks))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] MigrateError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("could not deserialize config file")]
    Toml(#[from] toml::de::Error),
    #[error("could not read stored value")]
    Json(#[from] serde_json::Error),
    #[error("error communicating with the portal")]
    Http(#[from] reqwest::Error),
    #[error("invalid url")]
    Url(#[from] url::ParseError),
    #[error("could not expand {0}")]
    Expansion(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("not signed in or the session expired")]
    Unauthorized,
    #[error("this requires an administrator")]
    Forbidden,
    #[error("{kind} not found at '{path}'")]
    NotFound { kind: ModelKind, path: String },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("portal responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("{field} {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
}

#[cfg(test)]
pub(crate) mod test {
    use std::collections::{BTreeSet, HashSet};

    use serde_json::json;
    use tempfile::tempdir;
    use url::Url;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::{
        filter::SortMode,
        models::WorkId,
        search::Query,
        session::Session,
        store::MemoryStore,
        Browse, Config, Portal,
    };

    pub async fn portal(server: &MockServer) -> Portal<MemoryStore> {
        let config = Config {
            database_path: "unused.db".into(),
            api_url: Url::parse(&format!("{}/api", server.uri())).expect("mock server url"),
            accept_invalid_certs: false,
        };

        Portal::new(config, MemoryStore::new()).expect("could not build portal")
    }

    async fn mount_works(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/final-works"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "Graphs", "submittedAt": "2024-01-01T00:00:00", "tags": [{"id": 1, "name": "x"}]},
                {"id": 2, "title": "Baroque", "submittedAt": "2024-03-01T00:00:00", "tags": [{"id": 2, "name": "y"}]},
                {"id": 3, "title": "Bridges", "submittedAt": "2024-02-01T00:00:00", "tags": []}
            ])))
            .mount(server)
            .await;
    }

    fn ids(works: &[crate::models::Work]) -> Vec<i64> {
        works.iter().map(|work| work.id.0).collect()
    }

    #[tokio::test]
    async fn test_browse() -> Result<(), crate::Error> {
        let server = MockServer::start().await;
        mount_works(&server).await;
        let mut portal = portal(&server).await;

        assert_eq!(ids(&portal.browse(&Browse::default()).await?), vec![1, 2, 3]);

        let browse = Browse {
            text: Some(String::from("b")),
            sort: Some(SortMode::Newest),
            ..Default::default()
        };
        assert_eq!(ids(&portal.browse(&browse).await?), vec![2, 3]);

        let browse = Browse {
            tags: HashSet::from([String::from("x")]),
            ..Default::default()
        };
        assert_eq!(ids(&portal.browse(&browse).await?), vec![1]);

        let browse = Browse {
            query: Some("-tag:x".parse::<Query>()?),
            limit: Some(1),
            ..Default::default()
        };
        assert_eq!(ids(&portal.browse(&browse).await?), vec![2]);

        Ok(())
    }

    #[tokio::test]
    async fn test_home_uses_local_ratings() -> Result<(), crate::Error> {
        let server = MockServer::start().await;
        mount_works(&server).await;
        let mut portal = portal(&server).await;

        portal.preferences.rate(WorkId(3), 5).await?;
        portal.preferences.rate(WorkId(1), 2).await?;

        let home = portal.home().await?;

        assert_eq!(ids(&home.newest), vec![2, 3, 1]);
        assert_eq!(ids(&home.top_rated), vec![3, 1, 2]);

        Ok(())
    }

    #[tokio::test]
    async fn test_home_without_ratings_keeps_api_order() -> Result<(), crate::Error> {
        let server = MockServer::start().await;
        mount_works(&server).await;
        let mut portal = portal(&server).await;

        let home = portal.home().await?;

        assert_eq!(ids(&home.top_rated), vec![1, 2, 3]);

        Ok(())
    }

    #[tokio::test]
    async fn test_bookmarked_works() -> Result<(), crate::Error> {
        let server = MockServer::start().await;
        mount_works(&server).await;
        let mut portal = portal(&server).await;

        portal.preferences.add_bookmark(WorkId(2)).await?;
        portal.preferences.add_bookmark(WorkId(99)).await?;

        assert_eq!(ids(&portal.bookmarked_works().await?), vec![2]);

        Ok(())
    }

    #[tokio::test]
    async fn test_unauthorized_signs_out() -> Result<(), crate::Error> {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/final-works"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let mut portal = portal(&server).await;
        portal.set_session(Some(Session::from_token("expired")));
        portal.preferences.add_bookmark(WorkId(1)).await?;
        portal.preferences.add_bookmark(WorkId(2)).await?;

        assert!(matches!(
            portal.works().await,
            Err(crate::Error::Unauthorized)
        ));
        assert!(portal.session().is_none());
        assert_eq!(
            portal.preferences.bookmarks().await?,
            BTreeSet::from([WorkId(1), WorkId(2)])
        );
        assert!(matches!(
            portal.require_session(),
            Err(crate::Error::Unauthorized)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_work_fills_in_aggregate_rating() -> Result<(), crate::Error> {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/final-works/4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 4, "title": "Rated"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/final-works/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5, "title": "Unrated"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/ratings/4/count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(3)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/ratings/4/average"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(4.5)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/ratings/5/count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(0)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/ratings/5/average"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(0.0)))
            .expect(0)
            .mount(&server)
            .await;

        let mut portal = portal(&server).await;

        let rated = portal.work(WorkId(4)).await?;
        assert_eq!(rated.average_rating, Some(4.5));
        assert_eq!(rated.rating_count, Some(3));

        let unrated = portal.work(WorkId(5)).await?;
        assert_eq!(unrated.average_rating, None);
        assert_eq!(unrated.rating_count, Some(0));

        Ok(())
    }

    #[tokio::test]
    async fn test_logout_clears_bookmarks() -> Result<(), crate::Error> {
        let server = MockServer::start().await;
        let mut portal = portal(&server).await;

        portal.set_session(Some(Session::from_token("token")));
        portal.preferences.add_bookmark(WorkId(1)).await?;

        portal.logout().await?;

        assert!(portal.session().is_none());
        assert!(portal.preferences.bookmarks().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_login() -> Result<(), crate::Error> {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "abc",
                "user": {"id": 1, "name": "Admin", "email": "admin@example.com", "role": "ADMIN"},
                "role": "ADMIN"
            })))
            .mount(&server)
            .await;

        let mut portal = portal(&server).await;
        let session = portal.login(" Admin@Example.com ", "Password1").await?;

        assert!(session.is_admin());
        assert_eq!(session.authorization(), "Bearer abc");

        Ok(())
    }

    #[tokio::test]
    async fn test_config_from_path() -> Result<(), crate::Error> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.toml");
        let database_path = dir.path().join("preferences.db");

        std::fs::write(
            &config_path,
            format!(
                "database_path = {:?}\napi_url = \"https://localhost:8443/api\"\n",
                database_path.to_string_lossy()
            ),
        )?;

        let portal = crate::Portal::from_path(&config_path).await?;

        assert!(!portal.config.accept_invalid_certs);
        assert_eq!(portal.api.base_url().as_str(), "https://localhost:8443/api/");
        assert!(database_path.exists());

        Ok(())
    }
}
