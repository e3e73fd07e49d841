use axum::extract::{FromRequest, Request};
use axum::Json;
use docstore::error::Error as DocError;
use crate::error::ApiError;

/// A `Json<T>` extractor whose rejection is folded into `ApiError` rather
/// than axum's default plain-text body, so a malformed request body still
/// gets the `{"error": "..."}` shape every other non-2xx response carries.
pub struct ValidJson<T>(pub T);

#[async_trait::async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(ApiError(DocError::InvalidPayload(rejection.to_string()))),
        }
    }
}
