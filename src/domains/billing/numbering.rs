use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Número de la factura emitida junto con una solicitud: `FAC-AAAAMMDD-NNNNNN`
pub fn numero_factura_cedulacion(fecha: NaiveDate, cedulacion_id: i32) -> String {
    format!("FAC-{}-{:06}", fecha.format("%Y%m%d"), cedulacion_id)
}

/// Número de una factura creada manualmente: `FAC-<milisegundos unix>`.
/// La unicidad la garantiza la restricción UNIQUE de la tabla.
pub fn numero_factura_manual(instante: DateTime<Utc>) -> String {
    format!("FAC-{}", instante.timestamp_millis())
}

/// Números manuales a probar en orden, un milisegundo aparte
pub fn numeros_factura_manual(instante: DateTime<Utc>, intentos: u32) -> impl Iterator<Item = String> {
    (0..intentos).map(move |n| numero_factura_manual(instante + Duration::milliseconds(i64::from(n))))
}
