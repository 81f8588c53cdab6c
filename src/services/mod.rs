pub mod access;
mod mongodb;
pub mod password;
mod review_service;
mod scraper_client;
mod session_service;
mod widget_service;

#[cfg(test)]
pub mod memory_store;

pub use mongodb::MongoDBService;
pub use review_service::ReviewService;
pub use scraper_client::{ApifyScraper, ScrapeError};
pub use session_service::{AuthContext, SessionError, SessionService, SESSION_COOKIE};
pub use widget_service::WidgetService;
