use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::{
    models::{
        AuthenticationResponse, Comment, CommentId, LoginRequest, ModelKind, NewComment, NewTag,
        Student, StudentId, StudentRequest, Tag, Work, WorkId, WorkRequest,
    },
    session::Session,
    validation::Validate,
};

/// Client for the portal REST API.
///
/// Calls that need an authenticated user take the [`Session`] explicitly;
/// reads accept an optional one. A `401` from the API surfaces as
/// [`crate::Error::Unauthorized`], it is up to the caller to drop the session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(mut base_url: Url, accept_invalid_certs: bool) -> Result<Self, crate::Error> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        session: Option<&Session>,
    ) -> Result<RequestBuilder, crate::Error> {
        let url = self.base_url.join(path)?;

        debug!("{method} {url}");

        let builder = self.http.request(method, url);

        Ok(match session {
            Some(session) => builder.header(reqwest::header::AUTHORIZATION, session.authorization()),
            None => builder,
        })
    }

    async fn send(
        &self,
        kind: ModelKind,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<Response, crate::Error> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();

        Err(match status {
            StatusCode::UNAUTHORIZED => crate::Error::Unauthorized,
            StatusCode::FORBIDDEN => crate::Error::Forbidden,
            StatusCode::NOT_FOUND => crate::Error::NotFound {
                kind,
                path: path.to_owned(),
            },
            StatusCode::CONFLICT => crate::Error::Conflict(message),
            status => crate::Error::Status {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        kind: ModelKind,
        path: &str,
        session: Option<&Session>,
    ) -> Result<T, crate::Error> {
        let builder = self.request(Method::GET, path, session)?;

        Ok(self.send(kind, path, builder).await?.json().await?)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        kind: ModelKind,
        path: &str,
        session: Option<&Session>,
        body: &B,
    ) -> Result<T, crate::Error> {
        let builder = self.request(method, path, session)?.json(body);

        Ok(self.send(kind, path, builder).await?.json().await?)
    }

    async fn delete(&self, kind: ModelKind, path: &str, session: &Session) -> Result<(), crate::Error> {
        let builder = self.request(Method::DELETE, path, Some(session))?;

        self.send(kind, path, builder).await?;

        Ok(())
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthenticationResponse, crate::Error> {
        info!("Logging in as {}", request.email);

        self.send_json(Method::POST, ModelKind::Student, "auth/login", None, request)
            .await
    }

    pub async fn register(
        &self,
        request: &StudentRequest,
    ) -> Result<AuthenticationResponse, crate::Error> {
        request.validate()?;

        info!("Registering {}", request.email);

        self.send_json(Method::POST, ModelKind::Student, "auth/register", None, request)
            .await
    }

    pub async fn works(&self, session: Option<&Session>) -> Result<Vec<Work>, crate::Error> {
        self.get(ModelKind::Work, "final-works", session).await
    }

    pub async fn work(&self, session: Option<&Session>, id: WorkId) -> Result<Work, crate::Error> {
        self.get(ModelKind::Work, &format!("final-works/{id}"), session)
            .await
    }

    pub async fn create_work(
        &self,
        session: &Session,
        request: &WorkRequest,
    ) -> Result<Work, crate::Error> {
        request.validate()?;

        let work: Work = self
            .send_json(Method::POST, ModelKind::Work, "final-works", Some(session), request)
            .await?;

        info!("Created work {}", work.id);

        Ok(work)
    }

    pub async fn update_work(
        &self,
        session: &Session,
        id: WorkId,
        request: &WorkRequest,
    ) -> Result<Work, crate::Error> {
        request.validate()?;

        let work = self
            .send_json(
                Method::PUT,
                ModelKind::Work,
                &format!("final-works/{id}"),
                Some(session),
                request,
            )
            .await?;

        info!("Updated work {id}");

        Ok(work)
    }

    pub async fn delete_work(&self, session: &Session, id: WorkId) -> Result<(), crate::Error> {
        session.require_admin()?;

        self.delete(ModelKind::Work, &format!("final-works/{id}"), session)
            .await?;

        info!("Deleted work {id}");

        Ok(())
    }

    pub async fn comments(
        &self,
        session: Option<&Session>,
        id: WorkId,
    ) -> Result<Vec<Comment>, crate::Error> {
        self.get(ModelKind::Work, &format!("final-works/{id}/comments"), session)
            .await
    }

    pub async fn add_comment(
        &self,
        session: &Session,
        id: WorkId,
        comment: &NewComment,
    ) -> Result<Comment, crate::Error> {
        comment.validate()?;

        let comment: Comment = self
            .send_json(
                Method::POST,
                ModelKind::Work,
                &format!("final-works/{id}/comments"),
                Some(session),
                comment,
            )
            .await?;

        info!("Added comment {} to work {id}", comment.id);

        Ok(comment)
    }

    pub async fn delete_comment(&self, session: &Session, id: CommentId) -> Result<(), crate::Error> {
        session.require_admin()?;

        self.delete(ModelKind::Comment, &format!("final-works/comments/{id}"), session)
            .await?;

        info!("Deleted comment {id}");

        Ok(())
    }

    pub async fn students(&self, session: &Session) -> Result<Vec<Student>, crate::Error> {
        session.require_admin()?;

        self.get(ModelKind::Student, "students", Some(session)).await
    }

    pub async fn student(&self, session: &Session, id: StudentId) -> Result<Student, crate::Error> {
        session.require_admin()?;

        self.get(ModelKind::Student, &format!("students/{id}"), Some(session))
            .await
    }

    pub async fn create_student(
        &self,
        session: &Session,
        request: &StudentRequest,
    ) -> Result<Student, crate::Error> {
        session.require_admin()?;

        request.validate()?;

        let student: Student = self
            .send_json(Method::POST, ModelKind::Student, "students", Some(session), request)
            .await?;

        info!("Created student {}", student.id);

        Ok(student)
    }

    pub async fn update_student(
        &self,
        session: &Session,
        id: StudentId,
        request: &StudentRequest,
    ) -> Result<Student, crate::Error> {
        session.require_admin()?;

        request.validate()?;

        let student = self
            .send_json(
                Method::PUT,
                ModelKind::Student,
                &format!("students/{id}"),
                Some(session),
                request,
            )
            .await?;

        info!("Updated student {id}");

        Ok(student)
    }

    pub async fn delete_student(&self, session: &Session, id: StudentId) -> Result<(), crate::Error> {
        session.require_admin()?;

        self.delete(ModelKind::Student, &format!("students/{id}"), session)
            .await?;

        info!("Deleted student {id}");

        Ok(())
    }

    pub async fn tags(&self, session: Option<&Session>) -> Result<Vec<Tag>, crate::Error> {
        self.get(ModelKind::Tag, "tags", session).await
    }

    pub async fn popular_tags(&self, session: Option<&Session>) -> Result<Vec<Tag>, crate::Error> {
        self.get(ModelKind::Tag, "tags/popular", session).await
    }

    pub async fn create_tag(&self, session: &Session, tag: &NewTag) -> Result<Tag, crate::Error> {
        tag.validate()?;

        let tag: Tag = self
            .send_json(Method::POST, ModelKind::Tag, "tags", Some(session), tag)
            .await?;

        info!("Created tag {}", tag.name);

        Ok(tag)
    }

    pub async fn average_rating(
        &self,
        session: Option<&Session>,
        id: WorkId,
    ) -> Result<f64, crate::Error> {
        self.get(ModelKind::Work, &format!("ratings/{id}/average"), session)
            .await
    }

    pub async fn rating_count(
        &self,
        session: Option<&Session>,
        id: WorkId,
    ) -> Result<u64, crate::Error> {
        self.get(ModelKind::Work, &format!("ratings/{id}/count"), session)
            .await
    }
}
