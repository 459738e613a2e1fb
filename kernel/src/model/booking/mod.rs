use crate::model::id::{BookingId, RoomId, UserId};
use crate::model::room::Room;

pub mod event;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booking {
    pub booking_id: BookingId,
    pub booked_by: UserId,
    pub room_id: RoomId,
}

// 予約照会で返す型。客室の情報も一緒に返す
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDetail {
    pub booking_id: BookingId,
    pub booked_by: UserId,
    pub room: Room,
}
