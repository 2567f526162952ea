use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::api::common::{entero_flexible, ApiError, ApiResult};
use crate::domains::billing::fecha_local;
use crate::models::{EstadoCedulacion, Genero, NuevaCedulacion};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CrearCedulacionRequest {
    #[validate(required, length(min = 1, code = "required"))]
    pub nombre_completo: Option<String>,
    pub cedula_original: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub fecha_nacimiento: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub lugar_nacimiento: Option<String>,
    #[validate(required, length(min = 1, code = "required"))]
    pub genero: Option<String>,
    pub foto_url: Option<String>,
    #[serde(default, deserialize_with = "entero_flexible")]
    #[validate(required, range(min = 1, max = 2147483647, message = "tribunal_id inválido"))]
    pub tribunal_id: Option<i64>,
    pub observaciones: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ActualizarEstadoRequest {
    #[validate(required, length(min = 1, code = "required"))]
    pub estado: Option<String>,
    pub cedula_nueva: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimiteQuery {
    pub limite: Option<i64>,
}

impl LimiteQuery {
    pub fn limite(&self) -> i64 {
        self.limite.unwrap_or(50).clamp(1, 100)
    }
}

fn requerido(campo: &str, valor: Option<String>) -> ApiResult<String> {
    opcional(valor).ok_or_else(|| ApiError::CamposRequeridos {
        campos: vec![campo.to_string()],
    })
}

/// Reporta juntos los campos obligatorios que solo traen espacios
fn sin_blancos(campos: &[(&str, Option<&str>)]) -> ApiResult<()> {
    let mut faltantes: Vec<String> = campos
        .iter()
        .filter(|(_, valor)| valor.map_or(true, |v| v.trim().is_empty()))
        .map(|(campo, _)| campo.to_string())
        .collect();
    if faltantes.is_empty() {
        return Ok(());
    }
    faltantes.sort();
    Err(ApiError::CamposRequeridos { campos: faltantes })
}

/// Texto opcional: los blancos cuentan como ausentes
pub(crate) fn opcional(valor: Option<String>) -> Option<String> {
    valor.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn limitar(campo: &str, valor: &str, maximo: usize) -> ApiResult<()> {
    if valor.chars().count() > maximo {
        return Err(ApiError::validacion(format!(
            "El campo {} no puede exceder {} caracteres",
            campo, maximo
        )));
    }
    Ok(())
}

/// `YYYY-MM-DD`, o un instante RFC 3339 del que se toma la fecha UTC
pub fn parse_fecha_nacimiento(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

impl CrearCedulacionRequest {
    pub fn into_nueva(self, ahora: DateTime<Utc>) -> ApiResult<NuevaCedulacion> {
        self.validate()?;
        sin_blancos(&[
            ("nombre_completo", self.nombre_completo.as_deref()),
            ("fecha_nacimiento", self.fecha_nacimiento.as_deref()),
            ("lugar_nacimiento", self.lugar_nacimiento.as_deref()),
            ("genero", self.genero.as_deref()),
        ])?;

        let genero: Genero = requerido("genero", self.genero)?
            .parse()
            .map_err(|_| ApiError::validacion("Género inválido"))?;

        let fecha_nacimiento = parse_fecha_nacimiento(&requerido("fecha_nacimiento", self.fecha_nacimiento)?)
            .ok_or_else(|| ApiError::validacion("Fecha de nacimiento inválida"))?;
        if fecha_nacimiento > fecha_local(ahora) {
            return Err(ApiError::validacion("La fecha de nacimiento no puede ser futura"));
        }

        let nombre_completo = requerido("nombre_completo", self.nombre_completo)?;
        let lugar_nacimiento = requerido("lugar_nacimiento", self.lugar_nacimiento)?;
        let cedula_original = opcional(self.cedula_original);

        limitar("nombre_completo", &nombre_completo, 300)?;
        limitar("lugar_nacimiento", &lugar_nacimiento, 200)?;
        if let Some(cedula) = &cedula_original {
            limitar("cedula_original", cedula, 30)?;
        }

        let tribunal_id = self
            .tribunal_id
            .and_then(|id| i32::try_from(id).ok())
            .ok_or_else(|| ApiError::validacion("tribunal_id inválido"))?;

        Ok(NuevaCedulacion {
            nombre_completo,
            cedula_original,
            fecha_nacimiento,
            lugar_nacimiento,
            genero,
            foto_url: opcional(self.foto_url),
            tribunal_id,
            observaciones: opcional(self.observaciones),
        })
    }
}

impl ActualizarEstadoRequest {
    pub fn into_parts(self) -> ApiResult<(EstadoCedulacion, Option<String>)> {
        self.validate()?;

        let estado: EstadoCedulacion = requerido("estado", self.estado)?
            .parse()
            .map_err(|_| ApiError::validacion("Estado inválido"))?;
        let cedula_nueva = opcional(self.cedula_nueva);
        if let Some(cedula) = &cedula_nueva {
            limitar("cedula_nueva", cedula, 30)?;
        }
        Ok((estado, cedula_nueva))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ahora() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap()
    }

    fn solicitud() -> CrearCedulacionRequest {
        serde_json::from_value(serde_json::json!({
            "nombre_completo": "María Fernanda Pérez",
            "fecha_nacimiento": "2007-05-14",
            "lugar_nacimiento": "Penonomé, Coclé",
            "genero": "Femenino",
            "tribunal_id": "2",
            "cedula_original": "  ",
        }))
        .unwrap()
    }

    #[test]
    fn valid_request_becomes_insert_row() {
        let nueva = solicitud().into_nueva(ahora()).unwrap();
        assert_eq!(nueva.tribunal_id, 2);
        assert_eq!(nueva.genero, Genero::Femenino);
        assert_eq!(nueva.fecha_nacimiento, NaiveDate::from_ymd_opt(2007, 5, 14).unwrap());
        assert_eq!(nueva.cedula_original, None);
    }

    #[test]
    fn missing_fields_are_reported_together() {
        let mut req = solicitud();
        req.nombre_completo = None;
        req.tribunal_id = None;
        match req.into_nueva(ahora()).unwrap_err() {
            ApiError::CamposRequeridos { campos } => {
                assert_eq!(campos, vec!["nombre_completo", "tribunal_id"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn blank_required_fields_are_named() {
        let mut req = solicitud();
        req.nombre_completo = Some("   ".into());
        req.lugar_nacimiento = Some("\t".into());
        match req.into_nueva(ahora()).unwrap_err() {
            ApiError::CamposRequeridos { campos } => {
                assert_eq!(campos, vec!["lugar_nacimiento", "nombre_completo"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let req = ActualizarEstadoRequest {
            estado: Some("  ".into()),
            cedula_nueva: None,
        };
        match req.into_parts().unwrap_err() {
            ApiError::CamposRequeridos { campos } => assert_eq!(campos, vec!["estado"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_gender_is_rejected() {
        let mut req = solicitud();
        req.genero = Some("femenino".into());
        let err = req.into_nueva(ahora()).unwrap_err();
        assert_eq!(err.public_message(), "Género inválido");
    }

    #[test]
    fn birth_date_accepts_iso_instants_and_rejects_future() {
        assert_eq!(
            parse_fecha_nacimiento("2007-05-14T00:00:00.000Z"),
            NaiveDate::from_ymd_opt(2007, 5, 14)
        );
        assert_eq!(parse_fecha_nacimiento("14/05/2007"), None);

        let mut req = solicitud();
        req.fecha_nacimiento = Some("2030-01-01".into());
        let err = req.into_nueva(ahora()).unwrap_err();
        assert_eq!(err.public_message(), "La fecha de nacimiento no puede ser futura");
    }

    #[test]
    fn estado_update_parses_known_states() {
        let req = ActualizarEstadoRequest {
            estado: Some("en_proceso".into()),
            cedula_nueva: Some("8-123-456".into()),
        };
        let (estado, cedula) = req.into_parts().unwrap();
        assert_eq!(estado, EstadoCedulacion::EnProceso);
        assert_eq!(cedula.as_deref(), Some("8-123-456"));

        let req = ActualizarEstadoRequest {
            estado: Some("archivado".into()),
            cedula_nueva: None,
        };
        assert_eq!(req.into_parts().unwrap_err().public_message(), "Estado inválido");
    }

    #[test]
    fn tribunal_limit_defaults_and_caps() {
        assert_eq!(LimiteQuery::default().limite(), 50);
        assert_eq!(LimiteQuery { limite: Some(1000) }.limite(), 100);
    }
}
