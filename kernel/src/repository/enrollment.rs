use crate::model::{enrollment::Enrollment, id::UserId};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    // ユーザー ID に紐づく参加登録を取得する
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Option<Enrollment>>;
}
