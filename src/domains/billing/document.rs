//! Documento imprimible de la factura (HTML listo para el diálogo de impresión)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt::Write;

use super::dates::zona_panama;
use crate::models::{Cedulacion, Factura, Tribunal};

#[derive(Debug, Clone, Serialize)]
pub struct LineaDocumento {
    pub servicio: String,
    pub tipo_servicio: String,
    pub cantidad: i32,
    pub precio_unitario: Decimal,
    pub subtotal: Decimal,
}

pub struct DocumentoFactura<'a> {
    pub factura: &'a Factura,
    pub solicitante: &'a Cedulacion,
    pub tribunal: &'a Tribunal,
    pub lineas: &'a [LineaDocumento],
}

const ESTILOS: &str = r#"
    body { font-family: Arial, sans-serif; margin: 20px; line-height: 1.4; }
    .header { text-align: center; margin-bottom: 30px; border-bottom: 3px solid #0066cc; padding-bottom: 20px; }
    .title { color: #333; font-size: 18px; margin-bottom: 5px; }
    .subtitle { color: #666; font-size: 14px; }
    .factura-header { display: flex; justify-content: space-between; align-items: flex-start; margin-bottom: 20px; }
    .factura-info { flex: 1; }
    .pago-info { text-align: right; flex: 1; }
    .info-grid { display: grid; grid-template-columns: 1fr 1fr; gap: 20px; margin: 20px 0; }
    .info-box { border: 1px solid #ddd; padding: 15px; border-radius: 5px; }
    .info-title { font-weight: bold; color: #0066cc; margin-bottom: 10px; }
    .table { width: 100%; border-collapse: collapse; margin: 20px 0; }
    .table th, .table td { border: 1px solid #ddd; padding: 10px; text-align: left; }
    .table th { background-color: #f5f5f5; font-weight: bold; }
    .totals { margin-top: 20px; text-align: right; }
    .total-row { margin: 5px 0; }
    .total-final { font-size: 18px; font-weight: bold; color: #0066cc; }
    .footer { margin-top: 40px; text-align: center; font-size: 12px; color: #666; border-top: 1px solid #ddd; padding-top: 20px; }
    .status { padding: 5px 10px; border-radius: 3px; font-size: 12px; font-weight: bold; }
    .status-pendiente { background-color: #fff3cd; color: #856404; }
    .status-pagado { background-color: #d4edda; color: #155724; }
    .status-cancelado { background-color: #f8d7da; color: #721c24; }
"#;

pub fn escape_html(texto: &str) -> String {
    let mut out = String::with_capacity(texto.len());
    for c in texto.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn formato_monto(monto: Decimal) -> String {
    format!(
        "B/. {:.2}",
        monto.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

pub fn formato_fecha(instante: DateTime<Utc>) -> String {
    instante.with_timezone(&zona_panama()).format("%d/%m/%Y").to_string()
}

fn formato_dia(fecha: NaiveDate) -> String {
    fecha.format("%d/%m/%Y").to_string()
}

fn o_na(valor: Option<&str>) -> String {
    match valor {
        Some(v) if !v.trim().is_empty() => escape_html(v),
        _ => "N/A".to_string(),
    }
}

pub fn render_factura_html(doc: &DocumentoFactura<'_>) -> String {
    let factura = doc.factura;
    let persona = doc.solicitante;
    let tribunal = doc.tribunal;
    let estado = factura.estado_pago.as_str();

    let mut html = String::with_capacity(8 * 1024);

    // write! sobre String no falla
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="utf-8" />
  <title>Factura {numero}</title>
  <style>{estilos}</style>
</head>
<body>
  <div class="header">
    <div class="title">DIRECCIÓN NACIONAL DE CEDULACIÓN</div>
    <div class="subtitle">República de Panamá</div>
  </div>

  <div class="info-section">
    <h2 style="color: #0066cc;">FACTURA N° {numero}</h2>
  </div>

  <div class="factura-header">
    <div class="factura-info">
      <p><strong>Fecha:</strong> {fecha}</p>
      <p><strong>Vence:</strong> {vence}</p>
      <p><strong>Estado:</strong> <span class="status status-{estado}">{estado_upper}</span></p>
    </div>
"#,
        numero = escape_html(&factura.numero_factura),
        estilos = ESTILOS,
        fecha = formato_fecha(factura.created_at),
        vence = formato_fecha(factura.fecha_vencimiento),
        estado = estado,
        estado_upper = estado.to_uppercase(),
    );

    if let Some(metodo) = factura.metodo_pago.as_deref().filter(|m| !m.trim().is_empty()) {
        let _ = write!(
            html,
            "    <div class=\"pago-info\">\n      <p><strong>Método de Pago:</strong> {}</p>\n",
            escape_html(metodo)
        );
        if let Some(fecha_pago) = factura.fecha_pago {
            let _ = write!(
                html,
                "      <p><strong>Fecha de Pago:</strong> {}</p>\n",
                formato_fecha(fecha_pago)
            );
        }
        html.push_str("    </div>\n");
    }
    html.push_str("  </div>\n");

    let _ = write!(
        html,
        r#"
  <div class="info-grid">
    <div class="info-box">
      <div class="info-title">DATOS DEL SOLICITANTE</div>
      <p><strong>Nombre:</strong> {nombre}</p>
      <p><strong>Cédula:</strong> {cedula}</p>
      <p><strong>Fecha Nacimiento:</strong> {nacimiento}</p>
      <p><strong>Lugar Nacimiento:</strong> {lugar}</p>
      <p><strong>Género:</strong> {genero}</p>
    </div>

    <div class="info-box">
      <div class="info-title">TRIBUNAL ASIGNADO</div>
      <p><strong>Nombre:</strong> {tribunal}</p>
      <p><strong>Provincia:</strong> {provincia}</p>
      <p><strong>Dirección:</strong> {direccion}</p>
      <p><strong>Teléfono:</strong> {telefono}</p>
    </div>
  </div>

  <div class="info-section">
    <h3 style="color: #0066cc;">DETALLE DE SERVICIOS</h3>
    <table class="table">
      <thead>
        <tr>
          <th>Servicio</th>
          <th>Tipo</th>
          <th>Cantidad</th>
          <th>Precio Unit.</th>
          <th>Subtotal</th>
        </tr>
      </thead>
      <tbody>
"#,
        nombre = escape_html(&persona.nombre_completo),
        cedula = o_na(persona.cedula_original.as_deref()),
        nacimiento = formato_dia(persona.fecha_nacimiento),
        lugar = escape_html(&persona.lugar_nacimiento),
        genero = persona.genero.as_str(),
        tribunal = escape_html(&tribunal.nombre),
        provincia = escape_html(&tribunal.provincia),
        direccion = o_na(tribunal.direccion.as_deref()),
        telefono = o_na(tribunal.telefono.as_deref()),
    );

    for linea in doc.lineas {
        let _ = write!(
            html,
            "        <tr>\n          <td>{}</td>\n          <td>{}</td>\n          <td>{}</td>\n          <td>{}</td>\n          <td>{}</td>\n        </tr>\n",
            escape_html(&linea.servicio),
            escape_html(&linea.tipo_servicio),
            linea.cantidad,
            formato_monto(linea.precio_unitario),
            formato_monto(linea.subtotal),
        );
    }

    let _ = write!(
        html,
        r#"      </tbody>
    </table>
  </div>

  <div class="totals">
    <div class="total-row"><strong>Subtotal: {subtotal}</strong></div>
    <div class="total-row"><strong>Impuestos: {impuestos}</strong></div>
    <div class="total-row total-final"><strong>TOTAL: {total}</strong></div>
  </div>

  <div class="footer">
    <p><strong>Tribunal Electoral de la República de Panamá</strong></p>
    <p>Dirección Nacional de Cedulación</p>
    <p>www.tribunal-electoral.gob.pa</p>
    <p>Esta factura es un documento oficial del Tribunal Electoral</p>
  </div>
</body>
</html>
"#,
        subtotal = formato_monto(factura.subtotal),
        impuestos = formato_monto(factura.impuestos),
        total = formato_monto(factura.total),
    );

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EstadoCedulacion, EstadoPago, Genero};
    use chrono::TimeZone;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn fixture() -> (Factura, Cedulacion, Tribunal, Vec<LineaDocumento>) {
        let creada = Utc.with_ymd_and_hms(2025, 8, 5, 15, 0, 0).unwrap();
        let factura = Factura {
            id: 1,
            cedulacion_id: 7,
            numero_factura: "FAC-20250805-000007".to_string(),
            subtotal: dec("17.5"),
            impuestos: dec("1.23"),
            total: dec("18.73"),
            estado_pago: EstadoPago::Pendiente,
            metodo_pago: None,
            fecha_vencimiento: Utc.with_ymd_and_hms(2025, 9, 5, 15, 0, 0).unwrap(),
            fecha_pago: None,
            created_at: creada,
            updated_at: creada,
        };
        let persona = Cedulacion {
            id: 7,
            nombre_completo: "Ana <b>Pérez</b> & Hijos".to_string(),
            cedula_original: None,
            cedula_nueva: None,
            fecha_nacimiento: NaiveDate::from_ymd_opt(1990, 2, 14).unwrap(),
            lugar_nacimiento: "Santiago".to_string(),
            genero: Genero::Femenino,
            foto_url: None,
            tribunal_id: 3,
            estado: EstadoCedulacion::Pendiente,
            observaciones: None,
            fecha_solicitud: creada,
            fecha_entrega_estimada: None,
            created_at: creada,
            updated_at: creada,
        };
        let tribunal = Tribunal {
            id: 3,
            nombre: "Dirección Regional de Santiago".to_string(),
            provincia: "Veraguas".to_string(),
            direccion: Some("Avenida Central".to_string()),
            telefono: None,
            tipo_establecimiento: None,
            horario_atencion: None,
            activo: true,
            created_at: creada,
        };
        let lineas = vec![LineaDocumento {
            servicio: "Renovación de cédula".to_string(),
            tipo_servicio: "Cedulación".to_string(),
            cantidad: 2,
            precio_unitario: dec("5"),
            subtotal: dec("10"),
        }];
        (factura, persona, tribunal, lineas)
    }

    #[test]
    fn renders_totals_and_lines() {
        let (factura, persona, tribunal, lineas) = fixture();
        let html = render_factura_html(&DocumentoFactura {
            factura: &factura,
            solicitante: &persona,
            tribunal: &tribunal,
            lineas: &lineas,
        });

        assert!(html.contains("FACTURA N° FAC-20250805-000007"));
        assert!(html.contains("<td>Renovación de cédula</td>"));
        assert!(html.contains("<td>B/. 5.00</td>"));
        assert!(html.contains("Subtotal: B/. 17.50"));
        assert!(html.contains("TOTAL: B/. 18.73"));
        assert!(html.contains("status-pendiente\">PENDIENTE"));
        assert!(html.contains("<strong>Fecha:</strong> 05/08/2025"));
        assert!(html.contains("<strong>Fecha Nacimiento:</strong> 14/02/1990"));
    }

    #[test]
    fn escapes_user_text_and_fills_missing_fields() {
        let (factura, persona, tribunal, lineas) = fixture();
        let html = render_factura_html(&DocumentoFactura {
            factura: &factura,
            solicitante: &persona,
            tribunal: &tribunal,
            lineas: &lineas,
        });

        assert!(html.contains("Ana &lt;b&gt;Pérez&lt;/b&gt; &amp; Hijos"));
        assert!(!html.contains("<b>Pérez</b>"));
        assert!(html.contains("<strong>Cédula:</strong> N/A"));
        assert!(html.contains("<strong>Teléfono:</strong> N/A"));
        assert!(!html.contains("Método de Pago"));
    }

    #[test]
    fn paid_invoice_shows_payment_block() {
        let (mut factura, persona, tribunal, lineas) = fixture();
        factura.estado_pago = EstadoPago::Pagado;
        factura.metodo_pago = Some("Tarjeta".to_string());
        factura.fecha_pago = Some(Utc.with_ymd_and_hms(2025, 8, 6, 16, 0, 0).unwrap());

        let html = render_factura_html(&DocumentoFactura {
            factura: &factura,
            solicitante: &persona,
            tribunal: &tribunal,
            lineas: &lineas,
        });

        assert!(html.contains("<strong>Método de Pago:</strong> Tarjeta"));
        assert!(html.contains("<strong>Fecha de Pago:</strong> 06/08/2025"));
        assert!(html.contains("status-pagado\">PAGADO"));
    }

    #[test]
    fn money_always_has_two_decimals() {
        assert_eq!(formato_monto(dec("7")), "B/. 7.00");
        assert_eq!(formato_monto(dec("7.5")), "B/. 7.50");
        assert_eq!(formato_monto(dec("0.735")), "B/. 0.74");
    }
}
