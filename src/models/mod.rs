pub mod cedulacion;
pub mod estados;
pub mod factura;
pub mod servicio;
pub mod tribunal;
pub mod vistas;

pub use cedulacion::{Cedulacion, CedulacionListItem, CedulacionPorTribunal, NuevaCedulacion};
pub use estados::{EstadoCedulacion, EstadoPago, Genero, ValorInvalido};
pub use factura::{Factura, FacturaDetalle};
pub use servicio::{Servicio, ServicioListItem};
pub use tribunal::{Tribunal, TribunalListItem};
pub use vistas::{
    CedulacionConTribunal, CedulacionDetalle, DetalleConServicio, DetalleServicioRow,
    Estadisticas, FacturaCompleta, FacturaConDetalles, ServicioResumen,
};
