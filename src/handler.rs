use crate::config::{EndpointSource, HandlerConfig, OverlapPolicy};
use crate::cookies::CookieJar;
use crate::errors::ToggleError;
use crate::models::{RequestPayload, ResourceId, ToggleOutcome};
use crate::page::PageSource;
use crate::state::{Board, InFlight, ToggleState};
use crate::transport::{CSRF_HEADER, LikeTransport, RequestContext};
use crate::ui::{ElementView, element_view, render_page};
use reqwest::Url;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// A click on a likeable element.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    target: ResourceId,
    prevented: u32,
}

impl ClickEvent {
    pub fn new(target: impl Into<ResourceId>) -> Self {
        Self {
            target: target.into(),
            prevented: 0,
        }
    }

    pub fn target(&self) -> &ResourceId {
        &self.target
    }

    pub fn prevent_default(&mut self) {
        self.prevented += 1;
    }

    pub fn default_prevented(&self) -> bool {
        self.prevented > 0
    }

    pub fn prevent_default_calls(&self) -> u32 {
        self.prevented
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied {
        outcome: ToggleOutcome,
        reloaded: bool,
    },
    /// The endpoint answered, but not with `status: "ok"`.
    Ignored { status: Option<String> },
    Failed,
    /// A later click for the same resource took over.
    Superseded,
}

#[derive(Debug)]
pub struct Pending {
    id: ResourceId,
    generation: u64,
    handle: JoinHandle<Completion>,
}

impl Pending {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn settled(self) -> Completion {
        match self.handle.await {
            Ok(completion) => completion,
            Err(err) if err.is_cancelled() => Completion::Superseded,
            Err(err) => {
                error!("like task for {} panicked: {err}", self.id);
                Completion::Failed
            }
        }
    }
}

#[derive(Debug)]
pub enum Dispatch {
    Sent(Pending),
    Suppressed,
}

struct Shared<T, P> {
    config: HandlerConfig,
    ctx: RequestContext,
    state: ToggleState,
    transport: T,
    page: P,
}

/// Owns the page record and turns clicks into like requests.
pub struct ToggleInteractionHandler<T, P> {
    shared: Arc<Shared<T, P>>,
}

impl<T: LikeTransport, P: PageSource> ToggleInteractionHandler<T, P> {
    /// Loads the page once, reads the CSRF token and binds every likeable
    /// element present in the snapshot.
    pub async fn init(
        config: HandlerConfig,
        origin: Url,
        cookie_header: Option<&str>,
        transport: T,
        page: P,
    ) -> Result<Self, ToggleError> {
        let snapshot = page.load().await?;
        let board = Board::from_snapshot(&snapshot);

        let jar = cookie_header.map(CookieJar::parse).unwrap_or_default();
        let csrf_token = jar.get(&config.csrf_cookie_name).map(str::to_owned);
        if csrf_token.is_none() {
            warn!(
                "no {} cookie, requests will go out without {CSRF_HEADER}",
                config.csrf_cookie_name
            );
        }

        let endpoint = resolve_endpoint(&config.endpoint, &board, &origin)?;
        info!(
            "bound {} like buttons, endpoint {endpoint}",
            board.elements().count()
        );

        let ctx = RequestContext::new(endpoint, csrf_token.as_deref(), cookie_header)?;

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                ctx,
                state: ToggleState::new(board),
                transport,
                page,
            }),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.shared.ctx.endpoint
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.shared.ctx.csrf_token()
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.shared.config
    }

    /// Suppresses the default action and dispatches one request carrying the
    /// element's current mode. Nothing on the page changes until the
    /// endpoint confirms.
    pub async fn click(&self, event: &mut ClickEvent) -> Result<Dispatch, ToggleError> {
        event.prevent_default();
        let id = event.target().clone();

        let mut page = self.shared.state.page.lock().await;
        let action = page
            .board
            .element(&id)
            .map(|element| element.action)
            .ok_or_else(|| ToggleError::UnknownElement(id.clone()))?;

        if let Some(marker) = page.in_flight.get(&id) {
            match self.shared.config.overlap {
                OverlapPolicy::Suppress => {
                    debug!("request for {id} still pending, click suppressed");
                    return Ok(Dispatch::Suppressed);
                }
                OverlapPolicy::Supersede => {
                    debug!("superseding pending request {} for {id}", marker.generation);
                    marker.abort.abort();
                }
            }
        }

        let generation = page.next_generation();
        let payload = RequestPayload {
            id: id.clone(),
            action,
        };
        let handle = tokio::spawn(run_toggle(Arc::clone(&self.shared), payload, generation));
        page.in_flight.insert(
            id.clone(),
            InFlight {
                generation,
                abort: handle.abort_handle(),
            },
        );

        Ok(Dispatch::Sent(Pending {
            id,
            generation,
            handle,
        }))
    }

    pub async fn in_flight(&self, id: &ResourceId) -> bool {
        self.shared.state.page.lock().await.in_flight.contains_key(id)
    }

    pub async fn view(&self, id: &ResourceId) -> Option<ElementView> {
        let page = self.shared.state.page.lock().await;
        let config = &self.shared.config;
        page.board
            .element(id)
            .map(|element| element_view(&page.board, element, config.label_style, config.counter_lookup))
    }

    pub async fn views(&self) -> Vec<ElementView> {
        let page = self.shared.state.page.lock().await;
        let config = &self.shared.config;
        page.board
            .elements()
            .map(|element| element_view(&page.board, element, config.label_style, config.counter_lookup))
            .collect()
    }

    pub async fn render(&self) -> String {
        let page = self.shared.state.page.lock().await;
        let config = &self.shared.config;
        render_page(&page.board, config.label_style, config.counter_lookup)
    }
}

fn resolve_endpoint(
    source: &EndpointSource,
    board: &Board,
    origin: &Url,
) -> Result<Url, ToggleError> {
    let raw = match source {
        EndpointSource::Fixed(url) => url.clone(),
        EndpointSource::FirstElement => board
            .first()
            .and_then(|element| element.url.clone())
            .ok_or(ToggleError::MissingEndpoint)?,
    };

    let endpoint = origin
        .join(&raw)
        .map_err(|err| ToggleError::invalid_url(raw.as_str(), err))?;
    if endpoint.origin() != origin.origin() {
        return Err(ToggleError::CrossOrigin {
            endpoint: endpoint.to_string(),
            origin: origin.origin().ascii_serialization(),
        });
    }
    Ok(endpoint)
}

async fn run_toggle<T: LikeTransport, P: PageSource>(
    shared: Arc<Shared<T, P>>,
    payload: RequestPayload,
    generation: u64,
) -> Completion {
    let result = shared.transport.send(&shared.ctx, &payload).await;
    let id = &payload.id;

    let (outcome, epoch) = {
        let mut page = shared.state.page.lock().await;
        if !page.finish(id, generation) {
            debug!("dropping stale response {generation} for {id}");
            return Completion::Superseded;
        }

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                error!("like request for {id} failed: {err}");
                return Completion::Failed;
            }
        };
        if !response.is_ok() {
            debug!("like request for {id} answered status {:?}", response.status);
            return Completion::Ignored {
                status: response.status,
            };
        }

        match page.apply_confirmed_toggle(id, shared.config.counter_lookup) {
            Some(outcome) => (outcome, page.toggle_epoch()),
            None => {
                warn!("{id} left the page before its like request completed");
                return Completion::Ignored {
                    status: response.status,
                };
            }
        }
    };
    info!("{id} toggled {} -> {}", outcome.previous, outcome.current);

    let reloaded = shared.config.reload_after_toggle && reload(&shared, epoch).await;
    Completion::Applied { outcome, reloaded }
}

/// Replaces the local record with whatever the server renders now, unless
/// another toggle was confirmed while the snapshot was loading.
async fn reload<T: LikeTransport, P: PageSource>(shared: &Shared<T, P>, epoch: u64) -> bool {
    match shared.page.load().await {
        Ok(snapshot) => {
            let replaced = shared.state.page.lock().await.replace_board(&snapshot, epoch);
            if !replaced {
                debug!("discarding reload from epoch {epoch}, a newer toggle landed");
            }
            replaced
        }
        Err(err) => {
            error!("page reload failed, keeping local state: {err}");
            false
        }
    }
}
