use crate::{
    extractor::AuthenticatedUser,
    model::booking::{
        BookingIdResponse, BookingResponse, CreateBookingRequest, UpdateBookingRequest,
    },
};
use axum::{
    extract::{Path, State},
    Json,
};
use garde::Validate;
use kernel::model::{
    booking::event::{CreateBooking, UpdateBookingRoom},
    id::{BookingId, RoomId},
};
use registry::AppRegistry;
use shared::error::AppResult;

// 自身の予約を客室情報付きで返す
pub async fn show_booking(
    user: AuthenticatedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingResponse>> {
    registry
        .booking_service()
        .fetch_booking(user.id())
        .await
        .map(BookingResponse::from)
        .map(Json)
}

pub async fn create_booking(
    user: AuthenticatedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookingRequest>,
) -> AppResult<Json<BookingIdResponse>> {
    req.validate()?;

    let event = CreateBooking::new(user.id(), RoomId::new(req.room_id));
    registry
        .booking_service()
        .create_booking(event)
        .await
        .map(BookingIdResponse::from)
        .map(Json)
}

pub async fn update_booking(
    user: AuthenticatedUser,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateBookingRequest>,
) -> AppResult<Json<BookingIdResponse>> {
    req.validate()?;

    let event = UpdateBookingRoom::new(booking_id, RoomId::new(req.room_id));
    registry
        .booking_service()
        .update_booking(event, user.id())
        .await
        .map(BookingIdResponse::from)
        .map(Json)
}
