use chrono::{DateTime, Utc};

use super::BillingError;
use crate::models::EstadoPago;

#[derive(Debug, Clone, PartialEq)]
pub struct CambioPago {
    pub estado_pago: EstadoPago,
    pub fecha_pago: Option<DateTime<Utc>>,
}

/// Calcula el nuevo estado de pago de una factura.
///
/// `cancelado` es terminal. Pasar a `pagado` registra la fecha de pago
/// (la indicada o `ahora`); una factura que ya estaba pagada conserva la
/// fecha registrada salvo que se indique otra. Cualquier otro estado la
/// deja en blanco.
pub fn transicion_pago(
    actual: EstadoPago,
    fecha_registrada: Option<DateTime<Utc>>,
    nuevo: EstadoPago,
    fecha_pago: Option<DateTime<Utc>>,
    ahora: DateTime<Utc>,
) -> Result<CambioPago, BillingError> {
    if actual == EstadoPago::Cancelado && nuevo != EstadoPago::Cancelado {
        return Err(BillingError::FacturaCancelada { nuevo });
    }

    match nuevo {
        EstadoPago::Pagado => {
            let vigente = match actual {
                EstadoPago::Pagado => fecha_registrada,
                _ => None,
            };
            Ok(CambioPago {
                estado_pago: nuevo,
                fecha_pago: Some(fecha_pago.or(vigente).unwrap_or(ahora)),
            })
        }
        EstadoPago::Pendiente | EstadoPago::Cancelado => {
            if fecha_pago.is_some() {
                return Err(BillingError::FechaPagoSinPago);
            }
            Ok(CambioPago {
                estado_pago: nuevo,
                fecha_pago: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ahora() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 10, 14, 0, 0).unwrap()
    }

    #[test]
    fn paying_stamps_now_by_default() {
        let cambio = transicion_pago(EstadoPago::Pendiente, None, EstadoPago::Pagado, None, ahora()).unwrap();
        assert_eq!(cambio.estado_pago, EstadoPago::Pagado);
        assert_eq!(cambio.fecha_pago, Some(ahora()));
    }

    #[test]
    fn paying_keeps_supplied_date() {
        let ayer = Utc.with_ymd_and_hms(2025, 8, 9, 9, 0, 0).unwrap();
        let cambio = transicion_pago(EstadoPago::Pendiente, None, EstadoPago::Pagado, Some(ayer), ahora()).unwrap();
        assert_eq!(cambio.fecha_pago, Some(ayer));
    }

    #[test]
    fn repeated_payment_keeps_recorded_date() {
        let registrada = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let cambio = transicion_pago(
            EstadoPago::Pagado,
            Some(registrada),
            EstadoPago::Pagado,
            None,
            ahora(),
        )
        .unwrap();
        assert_eq!(cambio.fecha_pago, Some(registrada));

        let corregida = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let cambio = transicion_pago(
            EstadoPago::Pagado,
            Some(registrada),
            EstadoPago::Pagado,
            Some(corregida),
            ahora(),
        )
        .unwrap();
        assert_eq!(cambio.fecha_pago, Some(corregida));
    }

    #[test]
    fn reverting_payment_clears_date() {
        let cambio = transicion_pago(EstadoPago::Pagado, Some(ahora()), EstadoPago::Pendiente, None, ahora()).unwrap();
        assert_eq!(cambio.fecha_pago, None);
    }

    #[test]
    fn cancelled_is_terminal() {
        assert_eq!(
            transicion_pago(EstadoPago::Cancelado, None, EstadoPago::Pagado, None, ahora()),
            Err(BillingError::FacturaCancelada { nuevo: EstadoPago::Pagado })
        );
        assert!(transicion_pago(EstadoPago::Cancelado, None, EstadoPago::Cancelado, None, ahora()).is_ok());
    }

    #[test]
    fn payment_date_requires_paid_status() {
        assert_eq!(
            transicion_pago(EstadoPago::Pendiente, None, EstadoPago::Cancelado, Some(ahora()), ahora()),
            Err(BillingError::FechaPagoSinPago)
        );
    }
}
