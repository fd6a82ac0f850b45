use chrono::{DateTime, Datelike, NaiveDate, Utc};

pub fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Age as a plain difference of calendar years, ignoring month and day
pub fn years_between(birthday: NaiveDate, now: DateTime<Utc>) -> i32 {
    now.year() - birthday.year()
}
