use sitebook_core::id::Uuid;

use crate::app::errors::ApiError;

pub fn parse_uuid(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::InvalidId(format!("`{raw}` is not a UUID")))
}
