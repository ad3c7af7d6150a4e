//! 时间工具函数
//!
//! 预约的日期和时间都是服务器本地时间 (无时区)。

use chrono::{Datelike, Local, NaiveDateTime, NaiveTime, Timelike};

const WEEKDAYS_ES: [&str; 7] = [
    "lunes",
    "martes",
    "miércoles",
    "jueves",
    "viernes",
    "sábado",
    "domingo",
];

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// 西班牙语长日期，如 `domingo, 1 de junio de 2025`
pub fn long_date_es(date: chrono::NaiveDate) -> String {
    let weekday = WEEKDAYS_ES[date.weekday().num_days_from_monday() as usize];
    let month = MONTHS_ES[date.month0() as usize];
    format!("{weekday}, {} de {month} de {}", date.day(), date.year())
}

/// `HH:MM`
pub fn hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// 去掉秒以下的精度
pub fn truncate_to_seconds(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}

/// 服务器本地当前时间 (精确到秒)
pub fn local_now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
