use kernel::model::{
    booking::{Booking, BookingDetail},
    id::{BookingId, HotelId, RoomId, UserId},
    room::Room,
};
use sqlx::types::chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
pub struct BookingRow {
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub room_id: RoomId,
}

impl From<BookingRow> for Booking {
    fn from(value: BookingRow) -> Self {
        let BookingRow {
            booking_id,
            user_id,
            room_id,
        } = value;
        Booking {
            booking_id,
            booked_by: user_id,
            room_id,
        }
    }
}

// 予約照会で使う型。客室の情報も一緒に取得する
#[derive(sqlx::FromRow)]
pub struct BookingRoomRow {
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub room_id: RoomId,
    pub hotel_id: HotelId,
    pub room_name: String,
    pub capacity: i32,
    pub booking_count: i64,
    pub room_created_at: DateTime<Utc>,
    pub room_updated_at: DateTime<Utc>,
}

impl From<BookingRoomRow> for BookingDetail {
    fn from(value: BookingRoomRow) -> Self {
        let BookingRoomRow {
            booking_id,
            user_id,
            room_id,
            hotel_id,
            room_name,
            capacity,
            booking_count,
            room_created_at,
            room_updated_at,
        } = value;
        BookingDetail {
            booking_id,
            booked_by: user_id,
            room: Room {
                room_id,
                hotel_id,
                name: room_name,
                capacity,
                booking_count,
                created_at: room_created_at,
                updated_at: room_updated_at,
            },
        }
    }
}
