use axum::{extract::FromRequestParts, http::request::Parts};
use kernel::model::id::UserId;
use shared::error::AppError;

// 認証済みユーザーを表す extractor。
//
// 認証自体は前段のゲートウェイ（本サービスの外側）が担い、
// 検証済みのユーザー ID を x-user-id ヘッダーで引き渡してくる。
// ヘッダーが無い・正整数でない場合は 401 を返す。
pub struct AuthenticatedUser {
    user_id: UserId,
}

impl AuthenticatedUser {
    pub fn id(&self) -> UserId {
        self.user_id
    }
}

pub const USER_ID_HEADER: &str = "x-user-id";

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::UnauthenticatedError)?;

        let user_id: i64 = raw.parse().map_err(|_| AppError::UnauthenticatedError)?;
        if user_id < 1 {
            return Err(AppError::UnauthenticatedError);
        }

        Ok(Self {
            user_id: UserId::new(user_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<AuthenticatedUser, AppError> {
        let (mut parts, _) = req.into_parts();
        AuthenticatedUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn valid_header_yields_user_id() {
        let req = Request::builder()
            .header(USER_ID_HEADER, "42")
            .body(())
            .unwrap();
        let user = extract(req).await.unwrap();
        assert_eq!(user.id(), UserId::new(42));
    }

    #[tokio::test]
    async fn missing_header_is_unauthenticated() {
        let req = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(req).await,
            Err(AppError::UnauthenticatedError)
        ));
    }

    #[tokio::test]
    async fn non_numeric_header_is_unauthenticated() {
        let req = Request::builder()
            .header(USER_ID_HEADER, "abc")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(req).await,
            Err(AppError::UnauthenticatedError)
        ));
    }

    #[tokio::test]
    async fn non_positive_header_is_unauthenticated() {
        let req = Request::builder()
            .header(USER_ID_HEADER, "0")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(req).await,
            Err(AppError::UnauthenticatedError)
        ));
    }
}
