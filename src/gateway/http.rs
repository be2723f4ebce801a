//! HTTP implementation of [`FeedGateway`].
//!
//! Talks to the small feed server: every operation is a plain request with
//! query-string parameters and a JSON answer.
//!
//! | op     | request                               | answer              |
//! |--------|---------------------------------------|---------------------|
//! | list   | `GET /list`                           | `[Post]`            |
//! | search | `GET /search?q=`                      | `[Post]`            |
//! | create | `GET /add?user=&message=[&image=]`    | anything 2xx        |
//! | delete | `GET /delete?id=`                     | anything 2xx        |
//! | like   | `GET /heart?id=`                      | `{"heart": n}`      |
//! | upload | `POST /upload` (multipart `image`)    | `{"path": "..."}`   |

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;

use super::{FeedGateway, ImagePayload, NewPost, Post, PostId};
use crate::error::GatewayError;

#[derive(Deserialize)]
struct LikeResponse {
    heart: u64,
}

#[derive(Deserialize)]
struct UploadResponse {
    path: String,
}

/// A feed gateway reached over HTTP.
#[derive(Clone)]
pub struct HttpGateway {
    base_url: Url,
    client: Client,
}

impl HttpGateway {
    /// Create a gateway for `base_url`.
    ///
    /// A missing scheme defaults to `http://`; trailing slashes are dropped.
    /// `timeout` bounds every request so a hung server shows up as a
    /// transient failure instead of a request that never settles.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = sanitize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.endpoint(path))
    }

    /// `path` is joined onto whatever path the base URL already has, so a
    /// gateway mounted under a prefix (`http://host/api`) keeps it.
    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!("{}{}", self.base_url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url
    }

    fn create_request(&self, post: &NewPost) -> RequestBuilder {
        let mut params = vec![("user", post.author.as_str()), ("message", post.body.as_str())];
        if let Some(image) = &post.image {
            params.push(("image", image.as_str()));
        }
        self.get("/add").query(&params)
    }
}

/// Map non-success statuses onto [`GatewayError`].
fn check(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(GatewayError::NotFound);
    }
    if !status.is_success() {
        return Err(GatewayError::Status {
            status: status.as_u16(),
        });
    }
    Ok(response)
}

fn sanitize_base_url(raw: &str) -> Result<Url> {
    let mut base = raw.trim().to_string();
    if !base.starts_with("http://") && !base.starts_with("https://") {
        base = format!("http://{base}");
    }
    while base.ends_with('/') {
        base.pop();
    }
    Url::parse(&base).with_context(|| format!("invalid gateway URL `{raw}`"))
}

#[async_trait]
impl FeedGateway for HttpGateway {
    async fn list(&self) -> Result<Vec<Post>, GatewayError> {
        let response = check(self.get("/list").send().await?)?;
        Ok(response.json().await?)
    }

    async fn search(&self, query: &str) -> Result<Vec<Post>, GatewayError> {
        let response = check(self.get("/search").query(&[("q", query)]).send().await?)?;
        Ok(response.json().await?)
    }

    async fn create(&self, post: &NewPost) -> Result<(), GatewayError> {
        check(self.create_request(post).send().await?)?;
        Ok(())
    }

    async fn delete(&self, id: PostId) -> Result<(), GatewayError> {
        check(self.get("/delete").query(&[("id", id.0)]).send().await?)?;
        Ok(())
    }

    async fn like(&self, id: PostId) -> Result<u64, GatewayError> {
        let response = check(self.get("/heart").query(&[("id", id.0)]).send().await?)?;
        let body: LikeResponse = response.json().await?;
        Ok(body.heart)
    }

    async fn upload(&self, image: &ImagePayload) -> Result<String, GatewayError> {
        let part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
        let form = Form::new().part("image", part);
        let response = check(
            self.client
                .post(self.endpoint("/upload"))
                .multipart(form)
                .send()
                .await?,
        )?;
        let body: UploadResponse = response.json().await?;
        Ok(body.path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
