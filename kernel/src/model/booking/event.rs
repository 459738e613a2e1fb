use crate::model::id::{BookingId, RoomId, UserId};
use derive_new::new;

#[derive(Debug, new)]
pub struct CreateBooking {
    pub booked_by: UserId,
    pub room_id: RoomId,
}

#[derive(Debug, new)]
pub struct UpdateBookingRoom {
    pub booking_id: BookingId,
    pub room_id: RoomId,
}
