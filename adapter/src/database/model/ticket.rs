use kernel::model::{
    id::{EnrollmentId, TicketId, TicketTypeId},
    ticket::{Ticket, TicketStatus, TicketType},
};
use shared::error::AppError;

#[derive(sqlx::FromRow)]
pub struct TicketRow {
    pub ticket_id: TicketId,
    pub enrollment_id: EnrollmentId,
    pub status: String,
    pub ticket_type_id: TicketTypeId,
    pub ticket_type_name: String,
    pub price: i32,
    pub is_remote: bool,
    pub includes_hotel: bool,
}

// status カラムは TEXT で保存されているため、変換に失敗し得る
impl TryFrom<TicketRow> for Ticket {
    type Error = AppError;

    fn try_from(value: TicketRow) -> Result<Self, Self::Error> {
        let TicketRow {
            ticket_id,
            enrollment_id,
            status,
            ticket_type_id,
            ticket_type_name,
            price,
            is_remote,
            includes_hotel,
        } = value;
        Ok(Ticket {
            ticket_id,
            enrollment_id,
            status: status.parse::<TicketStatus>()?,
            ticket_type: TicketType {
                ticket_type_id,
                name: ticket_type_name,
                price,
                is_remote,
                includes_hotel,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> TicketRow {
        TicketRow {
            ticket_id: TicketId::new(1),
            enrollment_id: EnrollmentId::new(2),
            status: status.into(),
            ticket_type_id: TicketTypeId::new(3),
            ticket_type_name: "Presential + Hotel".into(),
            price: 600,
            is_remote: false,
            includes_hotel: true,
        }
    }

    #[test]
    fn paid_ticket_row_converts() {
        let ticket = Ticket::try_from(row("PAID")).unwrap();
        assert_eq!(ticket.status, TicketStatus::Paid);
        assert!(ticket.ticket_type.includes_hotel);
    }

    #[test]
    fn unknown_status_is_a_conversion_error() {
        assert!(matches!(
            Ticket::try_from(row("EXPIRED")),
            Err(AppError::ConversionEntityError(_))
        ));
    }
}
