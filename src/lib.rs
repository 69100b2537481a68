pub mod config;
pub mod cookies;
pub mod errors;
pub mod handler;
pub mod models;
pub mod page;
pub mod state;
pub mod transport;
pub mod ui;

pub use config::HandlerConfig;
pub use errors::ToggleError;
pub use handler::{ClickEvent, Completion, Dispatch, Pending, ToggleInteractionHandler};
pub use models::{ResourceId, ToggleMode};
pub use page::{HttpPage, JsonFilePage, PageSource, StaticPage};
pub use transport::{LikeTransport, ReqwestTransport};
