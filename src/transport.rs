use crate::errors::ToggleError;
use crate::models::{RequestPayload, ResponsePayload};
use reqwest::{
    Client, Url,
    header::{COOKIE, HeaderValue},
    multipart::Form,
    redirect::{Action, Attempt, Policy},
};
use serde_json::Value;
use std::future::Future;

pub const CSRF_HEADER: &str = "X-CSRFToken";
const MAX_REDIRECTS: usize = 10;

/// Everything a like request needs besides the payload, resolved at init.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub endpoint: Url,
    pub csrf_token: Option<HeaderValue>,
    pub cookie_header: Option<HeaderValue>,
}

impl RequestContext {
    /// Header values are checked here so a request never goes out with a
    /// credential quietly dropped.
    pub fn new(
        endpoint: Url,
        csrf_token: Option<&str>,
        cookie_header: Option<&str>,
    ) -> Result<Self, ToggleError> {
        Ok(Self {
            endpoint,
            csrf_token: csrf_token.map(|token| header_value(CSRF_HEADER, token)).transpose()?,
            cookie_header: cookie_header
                .filter(|header| !header.trim().is_empty())
                .map(|header| header_value(COOKIE.as_str(), header))
                .transpose()?,
        })
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_ref().and_then(|value| value.to_str().ok())
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ToggleError> {
    HeaderValue::from_str(value).map_err(|err| ToggleError::InvalidHeader {
        name: name.to_string(),
        reason: err.to_string(),
    })
}

pub trait LikeTransport: Send + Sync + 'static {
    fn send(
        &self,
        ctx: &RequestContext,
        payload: &RequestPayload,
    ) -> impl Future<Output = Result<ResponsePayload, ToggleError>> + Send;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a client that only follows redirects inside `origin`.
    pub fn same_origin(origin: &Url) -> Result<Self, ToggleError> {
        let origin = origin.clone();
        let client = Client::builder()
            .redirect(Policy::custom(move |attempt| follow_within(&origin, attempt)))
            .build()?;
        Ok(Self { client })
    }
}

fn follow_within(origin: &Url, attempt: Attempt) -> Action {
    if attempt.previous().len() >= MAX_REDIRECTS {
        attempt.error("too many redirects")
    } else if attempt.url().origin() == origin.origin() {
        attempt.follow()
    } else {
        attempt.stop()
    }
}

impl LikeTransport for ReqwestTransport {
    async fn send(
        &self,
        ctx: &RequestContext,
        payload: &RequestPayload,
    ) -> Result<ResponsePayload, ToggleError> {
        let form = Form::new()
            .text("id", payload.id.to_string())
            .text("action", payload.action.as_str());

        let mut request = self.client.post(ctx.endpoint.clone()).multipart(form);
        if let Some(token) = &ctx.csrf_token {
            request = request.header(CSRF_HEADER, token.clone());
        }
        if let Some(cookies) = &ctx.cookie_header {
            request = request.header(COOKIE, cookies.clone());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToggleError::Status(status));
        }

        let body: Value = response.json().await?;
        Ok(ResponsePayload::from_value(&body))
    }
}
