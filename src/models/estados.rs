//! Valores enumerados que se guardan como texto en la base de datos

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Valor inválido para {campo}: '{valor}'")]
pub struct ValorInvalido {
    pub campo: &'static str,
    pub valor: String,
}

macro_rules! texto_enum {
    ($name:ident, $campo:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValorInvalido;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ValorInvalido {
                        campo: $campo,
                        valor: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValorInvalido;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Genero {
    Masculino,
    Femenino,
    Otro,
}

texto_enum!(Genero, "genero", {
    Masculino => "Masculino",
    Femenino => "Femenino",
    Otro => "Otro",
});

/// Estado del trámite de cedulación
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstadoCedulacion {
    Pendiente,
    EnProceso,
    Listo,
    Entregado,
    Cancelado,
}

texto_enum!(EstadoCedulacion, "estado", {
    Pendiente => "pendiente",
    EnProceso => "en_proceso",
    Listo => "listo",
    Entregado => "entregado",
    Cancelado => "cancelado",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstadoPago {
    Pendiente,
    Pagado,
    Cancelado,
}

texto_enum!(EstadoPago, "estado_pago", {
    Pendiente => "pendiente",
    Pagado => "pagado",
    Cancelado => "cancelado",
});

impl Default for EstadoPago {
    fn default() -> Self {
        EstadoPago::Pendiente
    }
}
