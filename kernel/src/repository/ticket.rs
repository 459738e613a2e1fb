use crate::model::{id::EnrollmentId, ticket::Ticket};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait TicketRepository: Send + Sync {
    // 参加登録 ID に紐づくチケットを取得する
    async fn find_by_enrollment(&self, enrollment_id: EnrollmentId) -> AppResult<Option<Ticket>>;
}
