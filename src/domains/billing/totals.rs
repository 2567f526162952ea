use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::BillingError;

/// Servicio cobrado con el precio del catálogo vigente
#[derive(Debug, Clone, PartialEq)]
pub struct LineaCobro {
    pub servicio_id: i32,
    pub cantidad: i32,
    pub precio_unitario: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineaCalculada {
    pub servicio_id: i32,
    pub cantidad: i32,
    pub precio_unitario: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Impuesto {
    /// Monto fijo en balboas
    Monto(Decimal),
    /// Fracción del subtotal, p. ej. 0.07
    Tasa(Decimal),
}

impl Default for Impuesto {
    fn default() -> Self {
        Impuesto::Monto(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totales {
    pub lineas: Vec<LineaCalculada>,
    pub subtotal: Decimal,
    pub impuestos: Decimal,
    pub total: Decimal,
}

/// Mayor valor que cabe en una columna NUMERIC(12,2)
pub const MONTO_MAXIMO: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

fn redondear(monto: Decimal) -> Decimal {
    monto.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn acotar(monto: Decimal) -> Result<Decimal, BillingError> {
    if monto > MONTO_MAXIMO {
        return Err(BillingError::MontoDesbordado);
    }
    Ok(monto)
}

/// `subtotal = Σ precio_unitario × cantidad`, `total = subtotal + impuestos`
pub fn calcular_totales(lineas: &[LineaCobro], impuesto: Impuesto) -> Result<Totales, BillingError> {
    if lineas.is_empty() {
        return Err(BillingError::SinLineas);
    }

    let mut calculadas = Vec::with_capacity(lineas.len());
    let mut subtotal = Decimal::ZERO;

    for linea in lineas {
        if linea.cantidad <= 0 {
            return Err(BillingError::CantidadInvalida {
                servicio_id: linea.servicio_id,
                cantidad: linea.cantidad,
            });
        }
        if linea.precio_unitario.is_sign_negative() {
            return Err(BillingError::PrecioNegativo {
                servicio_id: linea.servicio_id,
            });
        }

        let linea_subtotal = linea
            .precio_unitario
            .checked_mul(Decimal::from(linea.cantidad))
            .map(redondear)
            .ok_or(BillingError::MontoDesbordado)
            .and_then(acotar)?;
        subtotal = subtotal
            .checked_add(linea_subtotal)
            .ok_or(BillingError::MontoDesbordado)
            .and_then(acotar)?;

        calculadas.push(LineaCalculada {
            servicio_id: linea.servicio_id,
            cantidad: linea.cantidad,
            precio_unitario: linea.precio_unitario,
            subtotal: linea_subtotal,
        });
    }

    let impuestos = match impuesto {
        Impuesto::Monto(monto) => {
            if monto.is_sign_negative() {
                return Err(BillingError::ImpuestoNegativo);
            }
            acotar(redondear(monto))?
        }
        Impuesto::Tasa(tasa) => {
            if tasa.is_sign_negative() || tasa > Decimal::ONE {
                return Err(BillingError::TasaFueraDeRango { tasa });
            }
            subtotal
                .checked_mul(tasa)
                .map(redondear)
                .ok_or(BillingError::MontoDesbordado)
                .and_then(acotar)?
        }
    };

    let total = subtotal
        .checked_add(impuestos)
        .ok_or(BillingError::MontoDesbordado)
        .and_then(acotar)?;

    Ok(Totales {
        lineas: calculadas,
        subtotal,
        impuestos,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn linea(servicio_id: i32, cantidad: i32, precio: &str) -> LineaCobro {
        LineaCobro {
            servicio_id,
            cantidad,
            precio_unitario: precio.parse().unwrap(),
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn sums_lines_and_fixed_tax() {
        let totales = calcular_totales(
            &[linea(1, 2, "5.00"), linea(2, 1, "7.50")],
            Impuesto::Monto(dec("1.23")),
        )
        .unwrap();

        assert_eq!(totales.lineas[0].subtotal, dec("10.00"));
        assert_eq!(totales.lineas[1].subtotal, dec("7.50"));
        assert_eq!(totales.subtotal, dec("17.50"));
        assert_eq!(totales.impuestos, dec("1.23"));
        assert_eq!(totales.total, dec("18.73"));
    }

    #[test]
    fn tax_rate_rounds_half_away_from_zero() {
        // 7% de 10.50 = 0.735
        let totales = calcular_totales(&[linea(1, 1, "10.50")], Impuesto::Tasa(dec("0.07"))).unwrap();
        assert_eq!(totales.impuestos, dec("0.74"));
        assert_eq!(totales.total, dec("11.24"));
    }

    #[test]
    fn default_tax_is_zero() {
        let totales = calcular_totales(&[linea(1, 3, "3.00")], Impuesto::default()).unwrap();
        assert_eq!(totales.subtotal, totales.total);
        assert_eq!(totales.impuestos, Decimal::ZERO);
    }

    #[test]
    fn free_service_yields_zero_total() {
        let totales = calcular_totales(&[linea(1, 1, "0.00")], Impuesto::default()).unwrap();
        assert_eq!(totales.total, Decimal::ZERO);
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(calcular_totales(&[], Impuesto::default()), Err(BillingError::SinLineas));
        assert_eq!(
            calcular_totales(&[linea(4, 0, "1.00")], Impuesto::default()),
            Err(BillingError::CantidadInvalida { servicio_id: 4, cantidad: 0 })
        );
        assert_eq!(
            calcular_totales(&[linea(4, 1, "-1.00")], Impuesto::default()),
            Err(BillingError::PrecioNegativo { servicio_id: 4 })
        );
        assert_eq!(
            calcular_totales(&[linea(1, 1, "1.00")], Impuesto::Monto(dec("-0.01"))),
            Err(BillingError::ImpuestoNegativo)
        );
        assert!(matches!(
            calcular_totales(&[linea(1, 1, "1.00")], Impuesto::Tasa(dec("1.5"))),
            Err(BillingError::TasaFueraDeRango { .. })
        ));
    }

    #[test]
    fn amounts_must_fit_the_invoice_columns() {
        assert_eq!(MONTO_MAXIMO, dec("9999999999.99"));

        assert_eq!(
            calcular_totales(&[linea(1, 1, "1.00")], Impuesto::Monto(dec("100000000000"))),
            Err(BillingError::MontoDesbordado)
        );
        assert_eq!(
            calcular_totales(&[linea(1, 10000, "1000000000.00")], Impuesto::default()),
            Err(BillingError::MontoDesbordado)
        );
        // cada parte cabe pero la suma no
        assert_eq!(
            calcular_totales(&[linea(1, 1, "9999999999.99")], Impuesto::Monto(dec("0.01"))),
            Err(BillingError::MontoDesbordado)
        );

        let justo = calcular_totales(&[linea(1, 1, "9999999999.98")], Impuesto::Monto(dec("0.01"))).unwrap();
        assert_eq!(justo.total, MONTO_MAXIMO);
    }
}
