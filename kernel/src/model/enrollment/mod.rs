use crate::model::id::{EnrollmentId, UserId};

// イベントへの参加登録。宿泊予約の前提条件となるエンティティで、
// 参加登録サブシステム側が所有する（読み取り専用）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enrollment {
    pub enrollment_id: EnrollmentId,
    pub user_id: UserId,
}
