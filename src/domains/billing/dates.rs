use chrono::{DateTime, Duration, FixedOffset, Months, NaiveDate, Utc};

use super::BillingError;

/// Panamá no aplica horario de verano: UTC-5 todo el año
pub fn zona_panama() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).expect("UTC-5 is a valid offset")
}

/// Fecha calendario en Panamá para un instante UTC
pub fn fecha_local(instante: DateTime<Utc>) -> NaiveDate {
    instante.with_timezone(&zona_panama()).date_naive()
}

pub fn fecha_entrega_estimada(
    solicitud: DateTime<Utc>,
    dias: i64,
) -> Result<DateTime<Utc>, BillingError> {
    Duration::try_days(dias)
        .and_then(|delta| solicitud.checked_add_signed(delta))
        .ok_or(BillingError::FechaFueraDeRango)
}

/// Vencimiento a `meses` meses calendario de la creación; el día se ajusta
/// al último día del mes destino cuando este es más corto (31 ene → 28/29 feb).
pub fn fecha_vencimiento_por_defecto(
    creacion: DateTime<Utc>,
    meses: u32,
) -> Result<DateTime<Utc>, BillingError> {
    creacion
        .checked_add_months(Months::new(meses))
        .ok_or(BillingError::FechaFueraDeRango)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn delivery_is_seven_days_later() {
        let solicitud = Utc.with_ymd_and_hms(2025, 8, 28, 15, 30, 0).unwrap();
        let entrega = fecha_entrega_estimada(solicitud, 7).unwrap();
        assert_eq!(entrega, Utc.with_ymd_and_hms(2025, 9, 4, 15, 30, 0).unwrap());
    }

    #[test]
    fn due_date_adds_one_calendar_month() {
        let creacion = Utc.with_ymd_and_hms(2025, 3, 15, 10, 0, 0).unwrap();
        let vence = fecha_vencimiento_por_defecto(creacion, 1).unwrap();
        assert_eq!(vence, Utc.with_ymd_and_hms(2025, 4, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn due_date_clamps_to_end_of_month() {
        let creacion = Utc.with_ymd_and_hms(2025, 1, 31, 9, 0, 0).unwrap();
        let vence = fecha_vencimiento_por_defecto(creacion, 1).unwrap();
        assert_eq!(vence, Utc.with_ymd_and_hms(2025, 2, 28, 9, 0, 0).unwrap());

        let bisiesto = Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap();
        let vence = fecha_vencimiento_por_defecto(bisiesto, 1).unwrap();
        assert_eq!(vence, Utc.with_ymd_and_hms(2024, 2, 29, 9, 0, 0).unwrap());
    }

    #[test]
    fn local_date_uses_panama_offset() {
        // 02:00 UTC del 1 de agosto sigue siendo 31 de julio en Panamá
        let instante = Utc.with_ymd_and_hms(2025, 8, 1, 2, 0, 0).unwrap();
        assert_eq!(fecha_local(instante), NaiveDate::from_ymd_opt(2025, 7, 31).unwrap());
    }
}
