//! Reglas de facturación: totales, numeración, fechas y estados de pago.
//!
//! Todo en este módulo es puro; los handlers y repositorios lo usan dentro
//! de sus transacciones.

pub mod dates;
pub mod document;
pub mod numbering;
pub mod payment;
pub mod totals;

pub use dates::{fecha_entrega_estimada, fecha_local, fecha_vencimiento_por_defecto, zona_panama};
pub use document::{render_factura_html, DocumentoFactura, LineaDocumento};
pub use numbering::{numero_factura_cedulacion, numeros_factura_manual};
pub use payment::{transicion_pago, CambioPago};
pub use totals::{calcular_totales, Impuesto, LineaCalculada, LineaCobro, Totales};

use crate::models::EstadoPago;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BillingError {
    #[error("La factura debe incluir al menos un servicio")]
    SinLineas,

    #[error("Cantidad inválida ({cantidad}) para el servicio {servicio_id}")]
    CantidadInvalida { servicio_id: i32, cantidad: i32 },

    #[error("Precio unitario negativo para el servicio {servicio_id}")]
    PrecioNegativo { servicio_id: i32 },

    #[error("Los impuestos no pueden ser negativos")]
    ImpuestoNegativo,

    #[error("La tasa de impuesto debe estar entre 0 y 1, se recibió {tasa}")]
    TasaFueraDeRango { tasa: Decimal },

    #[error("El monto de la factura excede el máximo permitido")]
    MontoDesbordado,

    #[error("La fecha calculada está fuera de rango")]
    FechaFueraDeRango,

    #[error("Una factura cancelada no puede pasar a {nuevo}")]
    FacturaCancelada { nuevo: EstadoPago },

    #[error("La fecha de pago solo aplica a facturas pagadas")]
    FechaPagoSinPago,
}
