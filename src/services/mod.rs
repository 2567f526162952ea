//! Operaciones transaccionales y composición de lecturas sobre el pool

pub mod cedulacion_service;
pub mod factura_service;

pub use cedulacion_service::{CedulacionRegistrada, CedulacionService};
pub use factura_service::{ActualizacionPago, FacturaManual, FacturaService, ServicioSolicitado};
