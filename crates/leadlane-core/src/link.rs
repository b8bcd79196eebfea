//! Messaging deep-link formatter.
//!
//! Builds a WhatsApp link from a lead's digits-only phone number and a
//! templated greeting. Formatting only — the core never performs the
//! network call.

use url::Url;

use crate::model::Lead;

/// Build the `wa.me` deep link for a lead, or `None` when the phone field
/// carries no digits at all.
#[must_use]
pub fn whatsapp_link(lead: &Lead) -> Option<Url> {
    let digits = lead.phone_digits();
    if digits.is_empty() {
        return None;
    }
    let message = format!(
        "Hola {}, gracias por tu interés en {}. ¿Cuándo podemos llamarte?",
        lead.name, lead.vehicle_interest
    );
    let base = format!("https://wa.me/{digits}");
    Url::parse_with_params(&base, &[("text", message.as_str())]).ok()
}
