use anyhow::Result;

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub booking: BookingConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: std::env::var("DATABASE_HOST")?,
            port: std::env::var("DATABASE_PORT")?.parse()?,
            username: std::env::var("DATABASE_USERNAME")?,
            password: std::env::var("DATABASE_PASSWORD")?,
            database: std::env::var("DATABASE_NAME")?,
        };
        let booking = BookingConfig {
            strict_capacity: std::env::var("BOOKING_STRICT_CAPACITY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };
        Ok(Self { database, booking })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

// 定員チェックと書き込みをトランザクション内で行うかどうかの設定。
// strict_capacity が false の場合は従来どおり、サービス層での
// 事前チェックのみで書き込む（チェックと書き込みの間に競合し得る）。
pub struct BookingConfig {
    pub strict_capacity: bool,
}
