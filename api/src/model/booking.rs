use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    booking::BookingDetail,
    id::{BookingId, HotelId, RoomId, UserId},
    room::Room,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[garde(range(min = 1))]
    pub room_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    #[garde(range(min = 1))]
    pub room_id: i64,
}

// 予約作成・付け替えのどちらも予約 ID だけを返す
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingIdResponse {
    pub booking_id: BookingId,
}

impl From<BookingId> for BookingIdResponse {
    fn from(value: BookingId) -> Self {
        Self { booking_id: value }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: BookingId,
    pub user_id: UserId,
    pub room: RoomResponse,
}

impl From<BookingDetail> for BookingResponse {
    fn from(value: BookingDetail) -> Self {
        let BookingDetail {
            booking_id,
            booked_by,
            room,
        } = value;
        Self {
            id: booking_id,
            user_id: booked_by,
            room: room.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: RoomId,
    pub name: String,
    pub capacity: i32,
    pub hotel_id: HotelId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Room> for RoomResponse {
    fn from(value: Room) -> Self {
        let Room {
            room_id,
            hotel_id,
            name,
            capacity,
            booking_count: _,
            created_at,
            updated_at,
        } = value;
        Self {
            id: room_id,
            name,
            capacity,
            hotel_id,
            created_at,
            updated_at,
        }
    }
}
