use crate::model::{id::RoomId, room::Room};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait RoomRepository: Send + Sync {
    // 客室 ID から客室を取得する。booking_count には現時点の予約数が入る
    async fn find_by_id(&self, room_id: RoomId) -> AppResult<Option<Room>>;
}
