pub mod business_url;
pub mod error;
pub mod key;
pub mod review;
pub mod session;
pub mod user;
pub mod widget;

pub use business_url::*;
pub use error::*;
pub use key::*;
pub use review::*;
pub use session::*;
pub use user::*;
pub use widget::*;
