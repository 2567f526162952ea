use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::cedulaciones::models::opcional;
use crate::api::common::{entero_flexible, ApiError, ApiResult};
use crate::domains::billing::Impuesto;
use crate::models::EstadoPago;
use crate::services::{ActualizacionPago, FacturaManual, ServicioSolicitado};

const MAX_METODO_PAGO: usize = 50;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ServicioLineaRequest {
    #[serde(default, deserialize_with = "entero_flexible")]
    #[validate(required, range(min = 1, max = 2147483647, message = "servicio_id inválido"))]
    pub servicio_id: Option<i64>,
    /// Por defecto 1
    #[serde(default, deserialize_with = "entero_flexible")]
    #[validate(range(min = 1, max = 10000, message = "La cantidad debe estar entre 1 y 10000"))]
    pub cantidad: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CrearFacturaRequest {
    #[serde(default, deserialize_with = "entero_flexible")]
    #[validate(required, range(min = 1, max = 2147483647, message = "cedulacion_id inválido"))]
    pub cedulacion_id: Option<i64>,
    #[serde(default)]
    #[validate(length(min = 1, code = "required"), nested)]
    pub servicios: Vec<ServicioLineaRequest>,
    /// Monto fijo de impuestos
    pub impuestos: Option<Decimal>,
    /// Fracción del subtotal, excluyente con `impuestos`
    pub tasa_impuesto: Option<Decimal>,
    pub estado_pago: Option<String>,
    pub metodo_pago: Option<String>,
    pub fecha_vencimiento: Option<DateTime<Utc>>,
    pub fecha_pago: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ActualizarPagoRequest {
    #[validate(required, length(min = 1, code = "required"))]
    pub estado_pago: Option<String>,
    pub metodo_pago: Option<String>,
    pub fecha_pago: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct FacturaEliminada {
    pub id: i32,
}

fn estado_pago(raw: &str) -> ApiResult<EstadoPago> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::validacion("Estado de pago inválido"))
}

fn metodo_pago(raw: Option<String>) -> ApiResult<Option<String>> {
    let metodo = opcional(raw);
    if metodo.as_ref().is_some_and(|m| m.chars().count() > MAX_METODO_PAGO) {
        return Err(ApiError::validacion(format!(
            "El método de pago no puede exceder {} caracteres",
            MAX_METODO_PAGO
        )));
    }
    Ok(metodo)
}

fn a_i32(valor: Option<i64>, mensaje: &str) -> ApiResult<i32> {
    valor
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| ApiError::validacion(mensaje))
}

impl CrearFacturaRequest {
    pub fn into_factura(self) -> ApiResult<FacturaManual> {
        self.validate()?;

        let impuesto = match (self.impuestos, self.tasa_impuesto) {
            (Some(_), Some(_)) => {
                return Err(ApiError::validacion(
                    "Indique impuestos o tasa_impuesto, no ambos",
                ))
            }
            (Some(monto), None) => Impuesto::Monto(monto),
            (None, Some(tasa)) => Impuesto::Tasa(tasa),
            (None, None) => Impuesto::default(),
        };

        let servicios = self
            .servicios
            .into_iter()
            .map(|linea| {
                Ok(ServicioSolicitado {
                    servicio_id: a_i32(linea.servicio_id, "servicio_id inválido")?,
                    cantidad: a_i32(Some(linea.cantidad.unwrap_or(1)), "Cantidad inválida")?,
                })
            })
            .collect::<ApiResult<Vec<_>>>()?;

        let estado_pago = match self.estado_pago.as_deref().map(str::trim) {
            None | Some("") => EstadoPago::default(),
            Some(raw) => estado_pago(raw)?,
        };

        Ok(FacturaManual {
            cedulacion_id: a_i32(self.cedulacion_id, "cedulacion_id inválido")?,
            servicios,
            impuesto,
            estado_pago,
            metodo_pago: metodo_pago(self.metodo_pago)?,
            fecha_vencimiento: self.fecha_vencimiento,
            fecha_pago: self.fecha_pago,
        })
    }
}

impl ActualizarPagoRequest {
    pub fn into_actualizacion(self) -> ApiResult<ActualizacionPago> {
        self.validate()?;
        let estado = self
            .estado_pago
            .as_deref()
            .ok_or(ApiError::CamposRequeridos {
                campos: vec!["estado_pago".to_string()],
            })
            .and_then(estado_pago)?;

        Ok(ActualizacionPago {
            estado_pago: estado,
            metodo_pago: metodo_pago(self.metodo_pago)?,
            fecha_pago: self.fecha_pago,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> CrearFacturaRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn lines_default_to_one_unit_and_accept_text_ids() {
        let factura = request(json!({
            "cedulacion_id": "12",
            "servicios": [{ "servicio_id": 3 }, { "servicio_id": "6", "cantidad": 2 }],
            "impuestos": 1.5,
        }))
        .into_factura()
        .unwrap();

        assert_eq!(factura.cedulacion_id, 12);
        assert_eq!(
            factura.servicios,
            vec![
                ServicioSolicitado { servicio_id: 3, cantidad: 1 },
                ServicioSolicitado { servicio_id: 6, cantidad: 2 },
            ]
        );
        assert_eq!(factura.impuesto, Impuesto::Monto(Decimal::new(150, 2)));
        assert_eq!(factura.estado_pago, EstadoPago::Pendiente);
    }

    #[test]
    fn tax_rate_is_exclusive_with_amount() {
        let factura = request(json!({
            "cedulacion_id": 1,
            "servicios": [{ "servicio_id": 1 }],
            "tasa_impuesto": "0.07",
        }))
        .into_factura()
        .unwrap();
        assert_eq!(factura.impuesto, Impuesto::Tasa(Decimal::new(7, 2)));

        let err = request(json!({
            "cedulacion_id": 1,
            "servicios": [{ "servicio_id": 1 }],
            "impuestos": 2,
            "tasa_impuesto": 0.07,
        }))
        .into_factura()
        .unwrap_err();
        assert_eq!(err.public_message(), "Indique impuestos o tasa_impuesto, no ambos");
    }

    #[test]
    fn empty_or_incomplete_lines_are_missing_fields() {
        let err = request(json!({ "cedulacion_id": 1, "servicios": [] }))
            .into_factura()
            .unwrap_err();
        assert!(matches!(err, ApiError::CamposRequeridos { .. }));

        let err = request(json!({ "cedulacion_id": 1, "servicios": [{ "cantidad": 1 }] }))
            .into_factura()
            .unwrap_err();
        match err {
            ApiError::CamposRequeridos { campos } => {
                assert_eq!(campos, vec!["servicios[0].servicio_id"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nested_quantity_errors_keep_their_message() {
        let err = request(json!({
            "cedulacion_id": 1,
            "servicios": [{ "servicio_id": 1, "cantidad": 0 }],
        }))
        .into_factura()
        .unwrap_err();
        assert_eq!(err.public_message(), "La cantidad debe estar entre 1 y 10000");
    }

    #[test]
    fn payment_state_must_be_known() {
        let err = request(json!({
            "cedulacion_id": 1,
            "servicios": [{ "servicio_id": 1 }],
            "estado_pago": "reembolsado",
        }))
        .into_factura()
        .unwrap_err();
        assert_eq!(err.public_message(), "Estado de pago inválido");

        let err = ActualizarPagoRequest::default().into_actualizacion().unwrap_err();
        assert!(matches!(err, ApiError::CamposRequeridos { .. }));

        let cambio = ActualizarPagoRequest {
            estado_pago: Some("pagado".into()),
            metodo_pago: Some(" Efectivo ".into()),
            fecha_pago: None,
        }
        .into_actualizacion()
        .unwrap();
        assert_eq!(cambio.estado_pago, EstadoPago::Pagado);
        assert_eq!(cambio.metodo_pago.as_deref(), Some("Efectivo"));
    }
}
