pub mod embed_code;
pub mod embed_page;
pub mod layout_renderer;
pub mod review_filter;
pub mod url_hash;
pub mod widget_validator;
