use crate::model::id::{HotelId, RoomId};
use chrono::{DateTime, Utc};

// 客室はホテル管理サブシステム側が所有するエンティティであり、
// 本サービスからは読み取り専用である。
// booking_count には取得時点の有効な予約数が入る。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub room_id: RoomId,
    pub hotel_id: HotelId,
    pub name: String,
    pub capacity: i32,
    pub booking_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
