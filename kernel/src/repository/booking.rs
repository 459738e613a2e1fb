use crate::model::{
    booking::{
        event::{CreateBooking, UpdateBookingRoom},
        Booking, BookingDetail,
    },
    id::{BookingId, RoomId, UserId},
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    // 予約操作を行い、採番された予約 ID を返す
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId>;
    // 予約の客室を付け替える
    async fn update_room(&self, event: UpdateBookingRoom) -> AppResult<()>;
    // ユーザー ID に紐づく予約を客室情報付きで取得する
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Option<BookingDetail>>;
    // 予約 ID から予約を取得する
    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>>;
    // 客室 ID に紐づく予約の一覧を取得する
    async fn find_by_room(&self, room_id: RoomId) -> AppResult<Vec<Booking>>;
}
