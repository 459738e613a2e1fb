use kernel::model::{
    id::{HotelId, RoomId},
    room::Room,
};
use sqlx::types::chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
pub struct RoomRow {
    pub room_id: RoomId,
    pub hotel_id: HotelId,
    pub name: String,
    pub capacity: i32,
    pub booking_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(value: RoomRow) -> Self {
        let RoomRow {
            room_id,
            hotel_id,
            name,
            capacity,
            booking_count,
            created_at,
            updated_at,
        } = value;
        Room {
            room_id,
            hotel_id,
            name,
            capacity,
            booking_count,
            created_at,
            updated_at,
        }
    }
}
