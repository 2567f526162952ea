use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Request,
    },
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::domains::billing::BillingError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Envoltura estándar de las respuestas exitosas
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(headers: &HeaderMap, data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
            request_id: request_id(headers),
            timestamp: Utc::now(),
        }
    }

    pub fn with_message(headers: &HeaderMap, message: impl Into<String>, data: T) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::data(headers, data)
        }
    }
}

/// `x-request-id` asignado por [`request_logging_middleware`], o uno nuevo
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Faltan campos requeridos")]
    CamposRequeridos { campos: Vec<String> },

    #[error("{0}")]
    Validacion(String),

    #[error("ID inválido")]
    IdInvalido,

    #[error("{0}")]
    NoEncontrado(String),

    #[error("{0}")]
    Conflicto(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validacion(message: impl Into<String>) -> Self {
        Self::Validacion(message.into())
    }

    pub fn no_encontrado(message: impl Into<String>) -> Self {
        Self::NoEncontrado(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::CamposRequeridos { .. } | ApiError::Validacion(_) | ApiError::IdInvalido => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NoEncontrado(_) => StatusCode::NOT_FOUND,
            ApiError::Conflicto(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::CamposRequeridos { .. } => "MISSING_FIELDS",
            ApiError::Validacion(_) => "VALIDATION_ERROR",
            ApiError::IdInvalido => "INVALID_ID",
            ApiError::NoEncontrado(_) => "NOT_FOUND",
            ApiError::Conflicto(_) => "CONFLICT",
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Mensaje para el cliente; los fallos internos no exponen detalles
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Database(_) | ApiError::Internal(_) => "Error interno del servidor".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(code = self.error_code(), "{}", self);
        } else {
            warn!(code = self.error_code(), status = status.as_u16(), "{}", self);
        }

        let details = match &self {
            ApiError::CamposRequeridos { campos } => Some(serde_json::json!({ "campos": campos })),
            _ => None,
        };

        let body = ErrorBody {
            success: false,
            message: self.public_message(),
            code: self.error_code().to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db) = err.as_database_error() {
            if db.is_unique_violation() {
                let message = match db.constraint() {
                    Some("facturas_numero_factura_key") => "El número de factura ya existe",
                    _ => "Ya existe un registro con esos datos",
                };
                return ApiError::Conflicto(message.to_string());
            }
            if db.is_foreign_key_violation() {
                return ApiError::validacion("La referencia indicada no existe");
            }
            if db.is_check_violation() {
                return ApiError::validacion("Los datos no cumplen las reglas del registro");
            }
            // numeric_value_out_of_range
            if db.code().as_deref() == Some("22003") {
                return ApiError::validacion("El monto excede el máximo permitido");
            }
        }
        ApiError::Database(err)
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::FacturaCancelada { .. } => ApiError::Conflicto(err.to_string()),
            other => ApiError::Validacion(other.to_string()),
        }
    }
}

fn recorrer_errores(
    errors: &ValidationErrors,
    prefijo: &str,
    faltantes: &mut Vec<String>,
    mensajes: &mut Vec<String>,
) {
    for (campo, kind) in errors.errors() {
        let ruta = if prefijo.is_empty() {
            campo.to_string()
        } else {
            format!("{}.{}", prefijo, campo)
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for e in errs {
                    if e.code == "required" {
                        faltantes.push(ruta.clone());
                    } else if let Some(message) = &e.message {
                        mensajes.push(message.to_string());
                    } else {
                        mensajes.push(format!("Valor inválido en {}", ruta));
                    }
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                recorrer_errores(inner, &ruta, faltantes, mensajes);
            }
            ValidationErrorsKind::List(items) => {
                for (indice, inner) in items {
                    let ruta = format!("{}[{}]", ruta, indice);
                    recorrer_errores(inner, &ruta, faltantes, mensajes);
                }
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut faltantes = Vec::new();
        let mut mensajes = Vec::new();
        recorrer_errores(&errors, "", &mut faltantes, &mut mensajes);

        if !faltantes.is_empty() {
            faltantes.sort();
            faltantes.dedup();
            return ApiError::CamposRequeridos { campos: faltantes };
        }

        mensajes.sort();
        match mensajes.into_iter().next() {
            Some(message) => ApiError::Validacion(message),
            None => ApiError::validacion("Datos inválidos"),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validacion(format!("Cuerpo JSON inválido: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validacion(format!("Parámetros inválidos: {}", rejection.body_text()))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Los ids de ruta son enteros positivos
pub fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ApiError::IdInvalido)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EnteroOTexto {
    Entero(i64),
    Texto(String),
}

/// Acepta `7` o `"7"`; los formularios envían los ids como texto
pub fn entero_flexible<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<EnteroOTexto>::deserialize(deserializer)? {
        None => Ok(None),
        Some(EnteroOTexto::Entero(n)) => Ok(Some(n)),
        Some(EnteroOTexto::Texto(s)) if s.trim().is_empty() => Ok(None),
        Some(EnteroOTexto::Texto(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("'{}' no es un número entero", s))),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Paginacion {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Paginacion {
    pub const POR_DEFECTO: i64 = 50;
    pub const MAXIMO: i64 = 100;

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(Self::POR_DEFECTO).clamp(1, Self::MAXIMO)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Asigna un `x-request-id` y registra inicio y fin de cada petición
pub async fn request_logging_middleware(mut request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        request.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        "API request started"
    );

    let mut response = next.run(request).await;
    let execution_time = start_time.elapsed();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status(),
        execution_time_ms = execution_time.as_millis() as u64,
        "API request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Muestra {
        #[validate(required, length(min = 1, code = "required"))]
        nombre: Option<String>,
        #[validate(range(min = 1, message = "La cantidad debe ser al menos 1"))]
        cantidad: i32,
    }

    #[test]
    fn parse_id_accepts_only_positive_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(ApiError::IdInvalido)));
        assert!(matches!(parse_id("0"), Err(ApiError::IdInvalido)));
        assert!(matches!(parse_id("-3"), Err(ApiError::IdInvalido)));
    }

    #[test]
    fn missing_and_empty_fields_map_to_required() {
        let err: ApiError = Muestra { nombre: None, cantidad: 1 }.validate().unwrap_err().into();
        match err {
            ApiError::CamposRequeridos { campos } => assert_eq!(campos, vec!["nombre"]),
            other => panic!("unexpected error: {other:?}"),
        }

        let err: ApiError = Muestra { nombre: Some(String::new()), cantidad: 1 }
            .validate()
            .unwrap_err()
            .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Faltan campos requeridos");
    }

    #[test]
    fn other_validation_errors_keep_their_message() {
        let err: ApiError = Muestra { nombre: Some("Ana".into()), cantidad: 0 }
            .validate()
            .unwrap_err()
            .into();
        assert_eq!(err.public_message(), "La cantidad debe ser al menos 1");
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn cancelled_invoice_is_a_conflict() {
        let err: ApiError = BillingError::FacturaCancelada {
            nuevo: crate::models::EstadoPago::Pagado,
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err: ApiError = BillingError::SinLineas.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Error interno del servidor");
    }

    #[test]
    fn envelope_carries_request_id_and_timestamp() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-123"));

        let body = serde_json::to_value(ApiResponse::with_message(&headers, "Listo", 5)).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Listo");
        assert_eq!(body["data"], 5);
        assert_eq!(body["request_id"], "req-123");
        assert!(body["timestamp"].as_str().is_some());

        let body = serde_json::to_value(ApiResponse::data(&HeaderMap::new(), ())).unwrap();
        assert!(body.get("message").is_none());
        assert!(Uuid::parse_str(body["request_id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn pagination_is_clamped() {
        let p = Paginacion::default();
        assert_eq!((p.limit(), p.offset()), (50, 0));

        let p = Paginacion { limit: Some(500), offset: Some(-4) };
        assert_eq!((p.limit(), p.offset()), (100, 0));
    }

    #[derive(Debug, Deserialize)]
    struct ConId {
        #[serde(default, deserialize_with = "entero_flexible")]
        id: Option<i64>,
    }

    #[test]
    fn ids_arrive_as_numbers_or_text() {
        let a: ConId = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        let b: ConId = serde_json::from_str(r#"{"id": "7"}"#).unwrap();
        let c: ConId = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(a.id, Some(7));
        assert_eq!(b.id, Some(7));
        assert_eq!(c.id, None);
        assert!(serde_json::from_str::<ConId>(r#"{"id": "siete"}"#).is_err());
    }
}
