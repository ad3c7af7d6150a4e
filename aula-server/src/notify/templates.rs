//! Message texts (Spanish, as seen by users)

use super::ReservationNotice;
use crate::utils::time::{hhmm, long_date_es};

/// An e-mail ready to hand to a [`super::Mailer`]
///
/// `body` is the HTML part; `text` is the plain alternative for clients
/// that do not render HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub text: String,
}

const EMAIL_FOOTER: &str = "Este es un correo automático, por favor no responder.";

pub fn confirmation_message(n: &ReservationNotice) -> String {
    format!(
        "🏫 *Confirmación de Reserva - Sistema de Gestión de Aulas*\n\n\
         ✅ Reserva confirmada exitosamente\n\n\
         *Detalles de la reserva:*\n\
         Aula: {} - {}\n\
         Usuario: {}\n\
         Fecha: {}\n\
         Horario: {} - {}\n\n\
         Por favor, llega puntual y deja el aula en las mismas condiciones.\n\n\
         _Sistema de Gestión de Aulas_",
        n.room_name,
        n.room_module,
        n.user_name,
        long_date_es(n.date),
        hhmm(n.start_time),
        hhmm(n.end_time),
    )
}

pub fn cancellation_message(n: &ReservationNotice) -> String {
    format!(
        "*Reserva Cancelada*\n\n\
         Tu reserva ha sido cancelada:\n\n\
         Aula: {}\n\
         Usuario: {}\n\
         Fecha: {}\n\
         Hora: {}\n\n\
         _Sistema de Gestión de Aulas_",
        n.room_name,
        n.user_name,
        long_date_es(n.date),
        hhmm(n.start_time),
    )
}

pub fn confirmation_email(n: &ReservationNotice) -> OutgoingEmail {
    let date = long_date_es(n.date);
    let (start, end) = (hhmm(n.start_time), hhmm(n.end_time));

    let mut items = vec![
        info_item("🏫 Aula", &format!("{} - {}", escape(&n.room_name), escape(&n.room_module))),
        info_item("📅 Fecha", &escape(&date)),
        info_item("🕐 Hora de inicio", &start),
        info_item("🕐 Hora de fin", &end),
    ];
    if let Some(group) = &n.whatsapp_group {
        let group = escape(group);
        items.push(info_item(
            "💬 Grupo de WhatsApp",
            &format!("<a href=\"{group}\">{group}</a>"),
        ));
    }

    let body = layout(
        "#667eea",
        "✅ Reserva Confirmada",
        &format!(
            "<p>Hola <strong>{}</strong>,</p>\n\
             <p>Tu reserva ha sido confirmada exitosamente. Aquí están los detalles:</p>\n\
             <div class=\"info-box\">\n{}</div>\n\
             <p><strong>Importante:</strong></p>\n\
             <ul>\n\
             <li>Por favor llega a tiempo para aprovechar el aula completa.</li>\n\
             <li>Recuerda dejar el aula en las mismas condiciones en que la encontraste.</li>\n\
             <li>Si necesitas cancelar, hazlo con anticipación desde el sistema.</li>\n\
             </ul>",
            escape(&n.user_name),
            items.concat(),
        ),
    );

    let mut text = format!(
        "Hola {},\n\n\
         Tu reserva ha sido confirmada exitosamente. Aquí están los detalles:\n\n\
         Aula: {} - {}\n\
         Fecha: {}\n\
         Hora de inicio: {}\n\
         Hora de fin: {}\n",
        n.user_name, n.room_name, n.room_module, date, start, end,
    );
    if let Some(group) = &n.whatsapp_group {
        text.push_str(&format!("Grupo de WhatsApp: {group}\n"));
    }
    text.push_str(&format!(
        "\nImportante:\n\
         - Por favor llega a tiempo para aprovechar el aula completa.\n\
         - Recuerda dejar el aula en las mismas condiciones en que la encontraste.\n\
         - Si necesitas cancelar, hazlo con anticipación desde el sistema.\n\n\
         {EMAIL_FOOTER}\n\
         Sistema de Gestión de Aulas",
    ));

    OutgoingEmail {
        to: n.user_email.clone(),
        subject: format!("Confirmación de Reserva - {}", n.room_name),
        body,
        text,
    }
}

pub fn cancellation_email(n: &ReservationNotice) -> OutgoingEmail {
    let date = long_date_es(n.date);
    let start = hhmm(n.start_time);

    let body = layout(
        "#dc3545",
        "❌ Reserva Cancelada",
        &format!(
            "<p>Hola <strong>{}</strong>,</p>\n\
             <p>Tu reserva ha sido cancelada:</p>\n\
             <div class=\"info-box\">\n{}{}{}</div>\n\
             <p>Si deseas hacer una nueva reserva, puedes hacerlo desde el sistema.</p>",
            escape(&n.user_name),
            info_item("🏫 Aula", &escape(&n.room_name)),
            info_item("📅 Fecha", &escape(&date)),
            info_item("🕐 Hora", &start),
        ),
    );

    let text = format!(
        "Hola {},\n\n\
         Tu reserva ha sido cancelada:\n\n\
         Aula: {}\n\
         Fecha: {}\n\
         Hora: {}\n\n\
         Si deseas hacer una nueva reserva, puedes hacerlo desde el sistema.\n\n\
         Sistema de Gestión de Aulas",
        n.user_name, n.room_name, date, start,
    );

    OutgoingEmail {
        to: n.user_email.clone(),
        subject: format!("Reserva Cancelada - {}", n.room_name),
        body,
        text,
    }
}

/// `inner` must already be escaped
fn info_item(label: &str, inner: &str) -> String {
    format!("<p class=\"info-item\"><strong>{label}:</strong> {inner}</p>\n")
}

/// Full HTML document around `content`, with a header in `accent`
fn layout(accent: &str, title: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <style>\n\
         body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}\n\
         .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}\n\
         .header {{ background: {accent}; color: white; padding: 30px; text-align: center; border-radius: 10px 10px 0 0; }}\n\
         .content {{ background: #f9f9f9; padding: 30px; border-radius: 0 0 10px 10px; }}\n\
         .info-box {{ background: white; padding: 20px; margin: 20px 0; border-radius: 8px; border-left: 4px solid {accent}; }}\n\
         .info-item strong {{ color: {accent}; }}\n\
         .footer {{ text-align: center; color: #999; font-size: 12px; margin-top: 20px; }}\n\
         </style>\n\
         </head>\n\
         <body>\n\
         <div class=\"container\">\n\
         <div class=\"header\"><h1>{title}</h1></div>\n\
         <div class=\"content\">\n\
         {content}\n\
         <div class=\"footer\">\n\
         <p>{EMAIL_FOOTER}</p>\n\
         <p>Sistema de Gestión de Aulas</p>\n\
         </div>\n\
         </div>\n\
         </div>\n\
         </body>\n\
         </html>\n"
    )
}

/// Escape text for HTML element content and quoted attributes
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
