use time::{Month, OffsetDateTime, PrimitiveDateTime};

/// Local wall-clock reading. Falls back to UTC when the local offset cannot
/// be determined (e.g. a multi-threaded process on Unix).
pub fn local_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    PrimitiveDateTime::new(now.date(), now.time())
}

pub fn year_and_month(now: PrimitiveDateTime) -> (i32, Month) {
    (now.year(), now.month())
}
