// src/common/money.rs

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};

/// Maior valor que cabe em NUMERIC(12, 2): 9.999.999.999,99
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Reajuste anual aceito: (-100%, 100%]
pub const MAX_CPI_PERCENTAGE: Decimal = Decimal::ONE_HUNDRED;

/// Arredonda para 2 casas (meio para longe do zero).
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Valor proporcional aos dias ocupados: rate × occupied / total.
/// Retorna None se o período não tiver dias.
pub fn prorate_by_days(rate: Decimal, occupied_days: u32, total_days: u32) -> Option<Decimal> {
    if total_days == 0 {
        return None;
    }
    let occupied = Decimal::from(occupied_days.min(total_days));
    let total = Decimal::from(total_days);
    // Multiplica antes de dividir para não perder precisão
    Some(round2(rate * occupied / total))
}

/// Novo aluguel após o reajuste do IPC (percentual, ex.: 3.2 = 3,2%).
/// Retorna None se a conta estourar o `Decimal`.
pub fn apply_cpi(rate: Decimal, percentage: Decimal) -> Option<Decimal> {
    let factor = Decimal::ONE.checked_add(percentage.checked_div(Decimal::ONE_HUNDRED)?)?;
    rate.checked_mul(factor).map(round2)
}

/// Aceita "1234,50" e "1234.50".
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized).ok()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(Decimal),
    Text(String),
}

/// Deserializer para payloads que mandam o valor como número ou como texto com vírgula.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(value) => Ok(value),
        RawAmount::Text(text) => parse_amount(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("valor inválido: '{}'", text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(dec("10.005")), dec("10.01"));
        assert_eq!(round2(dec("10.004")), dec("10.00"));
        assert_eq!(round2(dec("-10.005")), dec("-10.01"));
        assert_eq!(round2(dec("500")), dec("500.00"));
    }

    #[test]
    fn prorates_the_remaining_days() {
        // 21 de um mês de 30 dias: 10 dias cobrados
        assert_eq!(prorate_by_days(dec("900.00"), 10, 30), Some(dec("300.00")));
        assert_eq!(prorate_by_days(dec("1000"), 10, 31), Some(dec("322.58")));
        assert_eq!(prorate_by_days(dec("750"), 31, 31), Some(dec("750.00")));
    }

    #[test]
    fn prorate_rejects_empty_periods() {
        assert_eq!(prorate_by_days(dec("900"), 0, 0), None);
    }

    #[test]
    fn cpi_adjustment_is_rounded() {
        assert_eq!(apply_cpi(dec("650"), dec("3.2")), Some(dec("670.80")));
        assert_eq!(apply_cpi(dec("333.33"), dec("2.5")), Some(dec("341.66")));
    }

    #[test]
    fn cpi_adjustment_overflow_is_none() {
        assert_eq!(apply_cpi(dec("650"), Decimal::MAX), None);
        assert_eq!(apply_cpi(Decimal::MAX, dec("50")), None);
    }

    #[test]
    fn max_amount_fits_numeric_12_2() {
        assert_eq!(MAX_AMOUNT, dec("9999999999.99"));
        assert_eq!(MAX_AMOUNT.to_string(), "9999999999.99");
    }

    #[test]
    fn parses_comma_and_dot_amounts() {
        assert_eq!(parse_amount("1234,5"), Some(dec("1234.5")));
        assert_eq!(parse_amount(" 3.2 "), Some(dec("3.2")));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn deserializes_numbers_and_text() {
        #[derive(Deserialize)]
        struct Payload {
            #[serde(deserialize_with = "deserialize_amount")]
            value: Decimal,
        }

        let from_text: Payload = serde_json::from_str(r#"{"value": "3,2"}"#).unwrap();
        assert_eq!(from_text.value, dec("3.2"));

        let from_number: Payload = serde_json::from_str(r#"{"value": 4}"#).unwrap();
        assert_eq!(from_number.value, dec("4"));

        assert!(serde_json::from_str::<Payload>(r#"{"value": "x"}"#).is_err());
    }
}
