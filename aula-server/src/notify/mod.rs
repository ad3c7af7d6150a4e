//! Reservation notifications
//!
//! Every create / cancel produces a WhatsApp share link (returned to the
//! caller) and an e-mail to the reservation owner. E-mail delivery runs on a
//! spawned task; failures are logged and never reach the caller.

pub mod mailer;
pub mod templates;
pub mod whatsapp;

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

pub use mailer::{LogMailer, MailError, Mailer, SesMailer};
pub use templates::OutgoingEmail;

/// Everything the message templates need about one reservation
#[derive(Debug, Clone)]
pub struct ReservationNotice {
    pub user_name: String,
    pub user_email: String,
    pub room_name: String,
    pub room_module: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub whatsapp_group: Option<String>,
}

#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    whatsapp_phone: Option<String>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, whatsapp_phone: Option<String>) -> Self {
        Self {
            mailer,
            whatsapp_phone,
        }
    }

    /// Send the confirmation e-mail and return the share link
    pub fn reservation_confirmed(&self, notice: &ReservationNotice) -> String {
        self.dispatch(templates::confirmation_email(notice));
        whatsapp::share_link(
            &templates::confirmation_message(notice),
            self.whatsapp_phone.as_deref(),
        )
    }

    /// Send the cancellation e-mail and return the share link
    pub fn reservation_cancelled(&self, notice: &ReservationNotice) -> String {
        self.dispatch(templates::cancellation_email(notice));
        whatsapp::share_link(
            &templates::cancellation_message(notice),
            self.whatsapp_phone.as_deref(),
        )
    }

    fn dispatch(&self, email: OutgoingEmail) {
        let mailer = self.mailer.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send(&email).await {
                tracing::warn!(to = %email.to, error = %e, "Failed to send notification email");
            }
        });
    }
}
