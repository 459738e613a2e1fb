use crate::model::{
    booking::{
        event::{CreateBooking, UpdateBookingRoom},
        BookingDetail,
    },
    id::{BookingId, UserId},
    ticket::TicketStatus,
};
use crate::repository::{
    booking::BookingRepository, enrollment::EnrollmentRepository, room::RoomRepository,
    ticket::TicketRepository,
};
use derive_new::new;
use shared::error::{AppError, AppResult};
use std::sync::Arc;

// 宿泊予約のビジネスルールを担うサービス。
//
// 各操作のチェック順は呼び出し側から見える契約である。
// 参照先が存在しないエラー（404 相当）を権限・業務ルール違反
// （403 相当）より先に返す。順序を変えると呼び出し側に見える
// ステータスコードが変わってしまうため、並べ替えてはならない。
#[derive(new)]
pub struct BookingService {
    booking_repository: Arc<dyn BookingRepository>,
    room_repository: Arc<dyn RoomRepository>,
    enrollment_repository: Arc<dyn EnrollmentRepository>,
    ticket_repository: Arc<dyn TicketRepository>,
}

impl BookingService {
    // ユーザー自身の予約を客室情報付きで返す
    pub async fn fetch_booking(&self, user_id: UserId) -> AppResult<BookingDetail> {
        self.booking_repository
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!("ユーザー（{user_id}）の予約が見つかりませんでした。"))
            })
    }

    pub async fn create_booking(&self, event: CreateBooking) -> AppResult<BookingId> {
        // ① 参加登録の存在確認
        let enrollment = self
            .enrollment_repository
            .find_by_user(event.booked_by)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!(
                    "ユーザー（{}）の参加登録が見つかりませんでした。",
                    event.booked_by
                ))
            })?;

        // ② チケットの存在確認
        let ticket = self
            .ticket_repository
            .find_by_enrollment(enrollment.enrollment_id)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!(
                    "参加登録（{}）のチケットが見つかりませんでした。",
                    enrollment.enrollment_id
                ))
            })?;

        // ③ 客室の存在確認
        let room = self
            .room_repository
            .find_by_id(event.room_id)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!(
                    "客室（{}）が見つかりませんでした。",
                    event.room_id
                ))
            })?;

        // ④ 予約資格チェック。
        //    リモート参加のチケット・宿泊を含まないチケット・
        //    支払い前（RESERVED）のチケットでは予約できない
        if ticket.ticket_type.is_remote
            || !ticket.ticket_type.includes_hotel
            || ticket.status == TicketStatus::Reserved
        {
            return Err(AppError::ForbiddenOperation(format!(
                "チケット（{}）では宿泊予約できません。",
                ticket.ticket_id
            )));
        }

        // ⑤ 定員チェック。すでに満室の客室は予約できない
        if room.booking_count + 1 > i64::from(room.capacity) {
            return Err(AppError::ForbiddenOperation(format!(
                "客室（{}）は満室です。",
                room.room_id
            )));
        }

        self.booking_repository.create(event).await
    }

    pub async fn update_booking(
        &self,
        event: UpdateBookingRoom,
        requested_user: UserId,
    ) -> AppResult<BookingId> {
        // ① 付け替え対象の予約の存在確認
        let booking = self
            .booking_repository
            .find_by_id(event.booking_id)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!(
                    "予約（{}）が見つかりませんでした。",
                    event.booking_id
                ))
            })?;

        // ② 操作ユーザー自身の予約の存在確認（所有チェックの材料）
        let own_booking = self.booking_repository.find_by_user(requested_user).await?;

        // ③ 所有チェック。他人の予約、または自身の予約が無い場合は拒否
        if booking.booked_by != requested_user || own_booking.is_none() {
            return Err(AppError::ForbiddenOperation(format!(
                "予約（{}）はユーザー（{requested_user}）のものではありません。",
                event.booking_id
            )));
        }

        // ④ 付け替え先の客室の存在確認
        let room = self
            .room_repository
            .find_by_id(event.room_id)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!(
                    "客室（{}）が見つかりませんでした。",
                    event.room_id
                ))
            })?;

        // ⑤ 付け替え先の定員チェック
        let bookings = self.booking_repository.find_by_room(event.room_id).await?;
        if bookings.len() as i64 + 1 > i64::from(room.capacity) {
            return Err(AppError::ForbiddenOperation(format!(
                "客室（{}）は満室です。",
                room.room_id
            )));
        }

        let booking_id = event.booking_id;
        self.booking_repository.update_room(event).await?;
        Ok(booking_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        booking::Booking,
        enrollment::Enrollment,
        id::{EnrollmentId, HotelId, RoomId, TicketId, TicketTypeId},
        room::Room,
        ticket::{Ticket, TicketType},
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    // テスト用のインメモリ実装。データベースの代わりに Vec を使う
    #[derive(Default)]
    struct InMemoryStore {
        bookings: Mutex<Vec<Booking>>,
        rooms: Mutex<Vec<Room>>,
        enrollments: Mutex<Vec<Enrollment>>,
        tickets: Mutex<Vec<Ticket>>,
        next_booking_id: Mutex<i64>,
    }

    #[async_trait]
    impl BookingRepository for InMemoryStore {
        async fn create(&self, event: CreateBooking) -> AppResult<BookingId> {
            let mut next_id = self.next_booking_id.lock().unwrap();
            *next_id += 1;
            let booking_id = BookingId::new(*next_id);
            self.bookings.lock().unwrap().push(Booking {
                booking_id,
                booked_by: event.booked_by,
                room_id: event.room_id,
            });
            Ok(booking_id)
        }

        async fn update_room(&self, event: UpdateBookingRoom) -> AppResult<()> {
            let mut bookings = self.bookings.lock().unwrap();
            let booking = bookings
                .iter_mut()
                .find(|b| b.booking_id == event.booking_id)
                .ok_or_else(|| AppError::EntityNotFound("booking not found".into()))?;
            booking.room_id = event.room_id;
            Ok(())
        }

        async fn find_by_user(&self, user_id: UserId) -> AppResult<Option<BookingDetail>> {
            let bookings = self.bookings.lock().unwrap();
            let rooms = self.rooms.lock().unwrap();
            let found = bookings.iter().find(|b| b.booked_by == user_id);
            Ok(found.map(|b| {
                let mut room = rooms
                    .iter()
                    .find(|r| r.room_id == b.room_id)
                    .cloned()
                    .expect("room referenced by booking must exist");
                room.booking_count =
                    bookings.iter().filter(|x| x.room_id == room.room_id).count() as i64;
                BookingDetail {
                    booking_id: b.booking_id,
                    booked_by: b.booked_by,
                    room,
                }
            }))
        }

        async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>> {
            let bookings = self.bookings.lock().unwrap();
            Ok(bookings.iter().find(|b| b.booking_id == booking_id).copied())
        }

        async fn find_by_room(&self, room_id: RoomId) -> AppResult<Vec<Booking>> {
            let bookings = self.bookings.lock().unwrap();
            Ok(bookings
                .iter()
                .filter(|b| b.room_id == room_id)
                .copied()
                .collect())
        }
    }

    #[async_trait]
    impl RoomRepository for InMemoryStore {
        async fn find_by_id(&self, room_id: RoomId) -> AppResult<Option<Room>> {
            let rooms = self.rooms.lock().unwrap();
            let bookings = self.bookings.lock().unwrap();
            Ok(rooms.iter().find(|r| r.room_id == room_id).cloned().map(
                |mut room| {
                    room.booking_count =
                        bookings.iter().filter(|b| b.room_id == room_id).count() as i64;
                    room
                },
            ))
        }
    }

    #[async_trait]
    impl EnrollmentRepository for InMemoryStore {
        async fn find_by_user(&self, user_id: UserId) -> AppResult<Option<Enrollment>> {
            let enrollments = self.enrollments.lock().unwrap();
            Ok(enrollments.iter().find(|e| e.user_id == user_id).copied())
        }
    }

    #[async_trait]
    impl TicketRepository for InMemoryStore {
        async fn find_by_enrollment(
            &self,
            enrollment_id: EnrollmentId,
        ) -> AppResult<Option<Ticket>> {
            let tickets = self.tickets.lock().unwrap();
            Ok(tickets
                .iter()
                .find(|t| t.enrollment_id == enrollment_id)
                .cloned())
        }
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        service: BookingService,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(InMemoryStore::default());
            let service = BookingService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
            );
            Self { store, service }
        }

        fn add_room(&self, room_id: i64, capacity: i32) -> RoomId {
            let room_id = RoomId::new(room_id);
            let now = Utc::now();
            self.store.rooms.lock().unwrap().push(Room {
                room_id,
                hotel_id: HotelId::new(1),
                name: "101".into(),
                capacity,
                booking_count: 0,
                created_at: now,
                updated_at: now,
            });
            room_id
        }

        fn add_enrollment(&self, enrollment_id: i64, user_id: UserId) -> EnrollmentId {
            let enrollment_id = EnrollmentId::new(enrollment_id);
            self.store.enrollments.lock().unwrap().push(Enrollment {
                enrollment_id,
                user_id,
            });
            enrollment_id
        }

        fn add_ticket(
            &self,
            ticket_id: i64,
            enrollment_id: EnrollmentId,
            status: TicketStatus,
            is_remote: bool,
            includes_hotel: bool,
        ) {
            self.store.tickets.lock().unwrap().push(Ticket {
                ticket_id: TicketId::new(ticket_id),
                enrollment_id,
                status,
                ticket_type: TicketType {
                    ticket_type_id: TicketTypeId::new(1),
                    name: "Presential + Hotel".into(),
                    price: 600,
                    is_remote,
                    includes_hotel,
                },
            });
        }

        // 参加登録＋宿泊可能な支払い済みチケットを持つユーザーを用意する
        fn add_eligible_user(&self, user_id: i64) -> UserId {
            let user_id = UserId::new(user_id);
            let enrollment_id = self.add_enrollment(user_id.raw(), user_id);
            self.add_ticket(user_id.raw(), enrollment_id, TicketStatus::Paid, false, true);
            user_id
        }

        async fn book(&self, user_id: UserId, room_id: RoomId) -> AppResult<BookingId> {
            self.service
                .create_booking(CreateBooking::new(user_id, room_id))
                .await
        }
    }

    fn assert_not_found<T: std::fmt::Debug>(res: AppResult<T>) {
        assert!(matches!(res, Err(AppError::EntityNotFound(_))), "{res:?}");
    }

    fn assert_forbidden<T: std::fmt::Debug>(res: AppResult<T>) {
        assert!(
            matches!(res, Err(AppError::ForbiddenOperation(_))),
            "{res:?}"
        );
    }

    #[tokio::test]
    async fn fetch_booking_returns_not_found_without_booking() {
        let fx = Fixture::new();
        assert_not_found(fx.service.fetch_booking(UserId::new(1)).await);
    }

    #[tokio::test]
    async fn fetch_booking_returns_own_booking_with_room() {
        let fx = Fixture::new();
        let room_id = fx.add_room(10, 3);
        let user_id = fx.add_eligible_user(1);
        let booking_id = fx.book(user_id, room_id).await.unwrap();

        let detail = fx.service.fetch_booking(user_id).await.unwrap();
        assert_eq!(detail.booking_id, booking_id);
        assert_eq!(detail.booked_by, user_id);
        assert_eq!(detail.room.room_id, room_id);
        assert_eq!(detail.room.capacity, 3);
    }

    #[tokio::test]
    async fn fetch_booking_is_idempotent() {
        let fx = Fixture::new();
        let room_id = fx.add_room(10, 3);
        let user_id = fx.add_eligible_user(1);
        fx.book(user_id, room_id).await.unwrap();

        let first = fx.service.fetch_booking(user_id).await.unwrap();
        let second = fx.service.fetch_booking(user_id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn create_booking_requires_enrollment() {
        let fx = Fixture::new();
        let room_id = fx.add_room(10, 3);
        assert_not_found(fx.book(UserId::new(1), room_id).await);
    }

    #[tokio::test]
    async fn create_booking_requires_ticket() {
        let fx = Fixture::new();
        let room_id = fx.add_room(10, 3);
        let user_id = UserId::new(1);
        fx.add_enrollment(1, user_id);
        assert_not_found(fx.book(user_id, room_id).await);
    }

    #[tokio::test]
    async fn create_booking_requires_room() {
        let fx = Fixture::new();
        let user_id = fx.add_eligible_user(1);
        assert_not_found(fx.book(user_id, RoomId::new(999)).await);
    }

    // 存在チェックは資格チェックより先に行われる。
    // 客室が無く、かつチケットが不適格な場合は 404 側が返る
    #[tokio::test]
    async fn missing_room_takes_precedence_over_ineligible_ticket() {
        let fx = Fixture::new();
        let user_id = UserId::new(1);
        let enrollment_id = fx.add_enrollment(1, user_id);
        fx.add_ticket(1, enrollment_id, TicketStatus::Paid, true, true);
        assert_not_found(fx.book(user_id, RoomId::new(999)).await);
    }

    #[tokio::test]
    async fn create_booking_rejects_remote_ticket() {
        let fx = Fixture::new();
        let room_id = fx.add_room(10, 3);
        let user_id = UserId::new(1);
        let enrollment_id = fx.add_enrollment(1, user_id);
        fx.add_ticket(1, enrollment_id, TicketStatus::Paid, true, true);
        assert_forbidden(fx.book(user_id, room_id).await);
    }

    #[tokio::test]
    async fn create_booking_rejects_ticket_without_hotel() {
        let fx = Fixture::new();
        let room_id = fx.add_room(10, 3);
        let user_id = UserId::new(1);
        let enrollment_id = fx.add_enrollment(1, user_id);
        fx.add_ticket(1, enrollment_id, TicketStatus::Paid, false, false);
        assert_forbidden(fx.book(user_id, room_id).await);
    }

    #[tokio::test]
    async fn create_booking_rejects_unpaid_ticket() {
        let fx = Fixture::new();
        let room_id = fx.add_room(10, 3);
        let user_id = UserId::new(1);
        let enrollment_id = fx.add_enrollment(1, user_id);
        fx.add_ticket(1, enrollment_id, TicketStatus::Reserved, false, true);
        assert_forbidden(fx.book(user_id, room_id).await);
    }

    // 定員 2 の客室に予約が 2 件ある状態では、適格なチケットでも拒否される
    #[tokio::test]
    async fn create_booking_rejects_full_room() {
        let fx = Fixture::new();
        let room_id = fx.add_room(10, 2);
        let first = fx.add_eligible_user(1);
        let second = fx.add_eligible_user(2);
        fx.book(first, room_id).await.unwrap();
        fx.book(second, room_id).await.unwrap();

        let third = fx.add_eligible_user(3);
        assert_forbidden(fx.book(third, room_id).await);
    }

    // 定員 2 の客室に予約が 1 件ある状態では、最後の 1 枠は予約できる
    #[tokio::test]
    async fn create_booking_fills_last_slot() {
        let fx = Fixture::new();
        let room_id = fx.add_room(10, 2);
        let first = fx.add_eligible_user(1);
        fx.book(first, room_id).await.unwrap();

        let second = fx.add_eligible_user(2);
        fx.book(second, room_id).await.unwrap();

        let bookings = fx.store.find_by_room(room_id).await.unwrap();
        assert_eq!(bookings.len(), 2);
    }

    #[tokio::test]
    async fn update_booking_requires_existing_booking() {
        let fx = Fixture::new();
        fx.add_room(10, 2);
        let user_id = fx.add_eligible_user(1);
        let res = fx
            .service
            .update_booking(
                UpdateBookingRoom::new(BookingId::new(999), RoomId::new(10)),
                user_id,
            )
            .await;
        assert_not_found(res);
    }

    #[tokio::test]
    async fn update_booking_rejects_foreign_booking() {
        let fx = Fixture::new();
        let room_id = fx.add_room(10, 2);
        let owner = fx.add_eligible_user(1);
        let booking_id = fx.book(owner, room_id).await.unwrap();

        // 操作ユーザーにも自身の予約を持たせ、所有チェックだけを外す
        let other_room = fx.add_room(11, 2);
        let intruder = fx.add_eligible_user(2);
        fx.book(intruder, other_room).await.unwrap();

        let res = fx
            .service
            .update_booking(UpdateBookingRoom::new(booking_id, other_room), intruder)
            .await;
        assert_forbidden(res);
    }

    #[tokio::test]
    async fn update_booking_requires_target_room() {
        let fx = Fixture::new();
        let room_id = fx.add_room(10, 2);
        let user_id = fx.add_eligible_user(1);
        let booking_id = fx.book(user_id, room_id).await.unwrap();

        let res = fx
            .service
            .update_booking(UpdateBookingRoom::new(booking_id, RoomId::new(999)), user_id)
            .await;
        assert_not_found(res);
    }

    #[tokio::test]
    async fn update_booking_rejects_full_target_room() {
        let fx = Fixture::new();
        let room_id = fx.add_room(10, 2);
        let user_id = fx.add_eligible_user(1);
        let booking_id = fx.book(user_id, room_id).await.unwrap();

        let target = fx.add_room(11, 1);
        let occupant = fx.add_eligible_user(2);
        fx.book(occupant, target).await.unwrap();

        let res = fx
            .service
            .update_booking(UpdateBookingRoom::new(booking_id, target), user_id)
            .await;
        assert_forbidden(res);
    }

    #[tokio::test]
    async fn update_booking_moves_booking_to_new_room() {
        let fx = Fixture::new();
        let room_id = fx.add_room(10, 2);
        let target = fx.add_room(11, 2);
        let user_id = fx.add_eligible_user(1);
        let booking_id = fx.book(user_id, room_id).await.unwrap();

        let updated = fx
            .service
            .update_booking(UpdateBookingRoom::new(booking_id, target), user_id)
            .await
            .unwrap();
        assert_eq!(updated, booking_id);

        let detail = fx.service.fetch_booking(user_id).await.unwrap();
        assert_eq!(detail.room.room_id, target);
        assert!(fx.store.find_by_room(room_id).await.unwrap().is_empty());
    }
}
