// src/common/calendar.rs

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

// ---
// Relógio injetável (o gerador nunca chama Utc::now() diretamente)
// ---
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Converte um instante UTC na data de calendário do fuso canônico de faturamento.
pub fn today_in(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    u32::from(date.num_days_in_month())
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_day_of_month(date);
    first + Days::new(u64::from(days_in_month(date) - 1))
}

/// Mesmo dia no ano seguinte. 29/02 vira 01/03 (não existe 29/02 no ano seguinte).
pub fn add_one_year(date: NaiveDate) -> NaiveDate {
    date.with_year(date.year() + 1)
        .unwrap_or(date + Days::new(366))
}

/// Data de renovação de um contrato: um ano depois do início, menos um dia.
pub fn renewal_date_for(start: NaiveDate) -> NaiveDate {
    add_one_year(start) - Days::new(1)
}

// ---
// Mês de faturamento: intervalo semiaberto [start, next_start)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingMonth {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub next_start: NaiveDate,
}

impl BillingMonth {
    pub fn containing(date: NaiveDate) -> Self {
        let start = first_day_of_month(date);
        let end = last_day_of_month(date);
        Self {
            start,
            end,
            next_start: end + Days::new(1),
        }
    }

    pub fn days(&self) -> u32 {
        self.end.day()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.next_start
    }

    /// "2024-03"
    pub fn label(&self) -> String {
        self.start.format("%Y-%m").to_string()
    }

    /// Meia-noite local do primeiro dia do mês seguinte, em UTC.
    pub fn next_start_instant(&self, tz: Tz) -> DateTime<Utc> {
        let local_midnight = self.next_start.and_time(NaiveTime::MIN);
        match tz.from_local_datetime(&local_midnight).earliest() {
            Some(local) => local.with_timezone(&Utc),
            // Meia-noite caiu num buraco de horário de verão
            None => Utc.from_utc_datetime(&local_midnight),
        }
    }
}
