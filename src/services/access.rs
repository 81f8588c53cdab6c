use mongodb::bson::oid::ObjectId;

use crate::models::{ApiError, BusinessUrl, Widget};
use crate::traits::Store;

/// Path ids must be ObjectIds; anything else is a 400.
pub fn parse_object_id(raw: &str, what: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| ApiError::BadRequest(format!("Invalid {} id", what)))
}

pub async fn owned_business_url(store: &dyn Store, user_id: &ObjectId, id: &ObjectId) -> Result<BusinessUrl, ApiError> {
    let business = store
        .find_business_url(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Business URL not found".to_string()))?;

    if !business.is_owned_by(user_id) {
        log::warn!("User {} denied access to business URL {}", user_id, id);
        return Err(ApiError::Forbidden);
    }
    Ok(business)
}

pub async fn owned_widget(store: &dyn Store, user_id: &ObjectId, id: &ObjectId) -> Result<Widget, ApiError> {
    let widget = store
        .find_widget(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Widget not found".to_string()))?;

    if !widget.is_owned_by(user_id) {
        log::warn!("User {} denied access to widget {}", user_id, id);
        return Err(ApiError::Forbidden);
    }
    Ok(widget)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_id() {
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex(), "widget").unwrap(), id);
        assert!(matches!(parse_object_id("abc123", "widget"), Err(ApiError::BadRequest(_))));
    }
}
