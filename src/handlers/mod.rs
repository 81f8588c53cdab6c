pub mod auth_handlers;
pub mod business_url_handlers;
pub mod dashboard_handlers;
pub mod embed_handlers;
pub mod widget_handlers;

#[cfg(test)]
pub mod test_support;
