use crate::database::{
    model::booking::{BookingRoomRow, BookingRow},
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    booking::{
        event::{CreateBooking, UpdateBookingRoom},
        Booking, BookingDetail,
    },
    id::{BookingId, RoomId, UserId},
};
use kernel::repository::booking::BookingRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct BookingRepositoryImpl {
    db: ConnectionPool,
    // true の場合、書き込みは SERIALIZABLE トランザクション内で
    // 定員を再チェックしてから行う（チェックと書き込みの競合対策）
    strict_capacity: bool,
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    // 予約操作を行う
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId> {
        if self.strict_capacity {
            return self.create_with_capacity_recheck(event).await;
        }

        let booking_id: BookingId = sqlx::query_scalar(
            r#"
                INSERT INTO bookings (user_id, room_id)
                VALUES ($1, $2)
                RETURNING booking_id
                ;
            "#,
        )
        .bind(event.booked_by)
        .bind(event.room_id)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(booking_id)
    }

    // 予約の客室を付け替える
    async fn update_room(&self, event: UpdateBookingRoom) -> AppResult<()> {
        if self.strict_capacity {
            return self.update_room_with_capacity_recheck(event).await;
        }

        let res = sqlx::query(
            r#"
                UPDATE bookings
                SET
                    room_id = $1,
                    updated_at = NOW()
                WHERE booking_id = $2
            "#,
        )
        .bind(event.room_id)
        .bind(event.booking_id)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(
                "specified booking not found".into(),
            ));
        }

        Ok(())
    }

    // ユーザー ID に紐づく予約を取得する
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Option<BookingDetail>> {
        sqlx::query_as::<_, BookingRoomRow>(
            r#"
                SELECT
                b.booking_id,
                b.user_id,
                r.room_id,
                r.hotel_id,
                r.name AS room_name,
                r.capacity,
                (
                    SELECT COUNT(*) FROM bookings AS b2
                    WHERE b2.room_id = r.room_id
                ) AS booking_count,
                r.created_at AS room_created_at,
                r.updated_at AS room_updated_at
                FROM bookings AS b
                INNER JOIN rooms AS r ON b.room_id = r.room_id
                WHERE b.user_id = $1
                ;
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map(|row| row.map(BookingDetail::from))
        .map_err(AppError::SpecificOperationError)
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, BookingRow>(
            r#"
                SELECT booking_id, user_id, room_id
                FROM bookings
                WHERE booking_id = $1
                ;
            "#,
        )
        .bind(booking_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map(|row| row.map(Booking::from))
        .map_err(AppError::SpecificOperationError)
    }

    // 客室 ID に紐づく予約の一覧を取得する
    async fn find_by_room(&self, room_id: RoomId) -> AppResult<Vec<Booking>> {
        sqlx::query_as::<_, BookingRow>(
            r#"
                SELECT booking_id, user_id, room_id
                FROM bookings
                WHERE room_id = $1
                ORDER BY created_at ASC
                ;
            "#,
        )
        .bind(room_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Booking::from).collect())
        .map_err(AppError::SpecificOperationError)
    }
}

impl BookingRepositoryImpl {
    // strict_capacity 有効時の予約作成。
    // 定員の再チェックと INSERT を単一の SERIALIZABLE トランザクション
    // にまとめ、チェック後・書き込み前に他の予約が入る余地をなくす
    async fn create_with_capacity_recheck(&self, event: CreateBooking) -> AppResult<BookingId> {
        let mut tx = self.db.begin().await?;

        self.set_transaction_serializable(&mut tx).await?;

        self.check_capacity_in_tx(&mut tx, event.room_id).await?;

        let booking_id: BookingId = sqlx::query_scalar(
            r#"
                INSERT INTO bookings (user_id, room_id)
                VALUES ($1, $2)
                RETURNING booking_id
                ;
            "#,
        )
        .bind(event.booked_by)
        .bind(event.room_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(booking_id)
    }

    async fn update_room_with_capacity_recheck(&self, event: UpdateBookingRoom) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        self.set_transaction_serializable(&mut tx).await?;

        self.check_capacity_in_tx(&mut tx, event.room_id).await?;

        let res = sqlx::query(
            r#"
                UPDATE bookings
                SET
                    room_id = $1,
                    updated_at = NOW()
                WHERE booking_id = $2
            "#,
        )
        .bind(event.room_id)
        .bind(event.booking_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(
                "specified booking not found".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    // トランザクション分離レベルを SERIALIZABLE に設定するために
    // 内部的に使うメソッド
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    // トランザクション内で客室の定員と現在の予約数を取り直して照合する
    async fn check_capacity_in_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        room_id: RoomId,
    ) -> AppResult<()> {
        let capacity: Option<i32> = sqlx::query_scalar(
            r#"
                SELECT capacity FROM rooms WHERE room_id = $1
            "#,
        )
        .bind(room_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(capacity) = capacity else {
            return Err(AppError::EntityNotFound(format!(
                "客室（{room_id}）が見つかりませんでした。"
            )));
        };

        let booking_count: i64 = sqlx::query_scalar(
            r#"
                SELECT COUNT(*) FROM bookings WHERE room_id = $1
            "#,
        )
        .bind(room_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if booking_count + 1 > i64::from(capacity) {
            return Err(AppError::ForbiddenOperation(format!(
                "客室（{room_id}）は満室です。"
            )));
        }

        Ok(())
    }
}
