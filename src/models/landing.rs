use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Landing-page configuration, one row per barbershop. The logo blob is
/// fetched separately and never serialized with the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingPage {
    pub barbershop_id: String,
    pub title: String,
    pub about: String,
    pub theme_color: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub published: bool,
    pub has_logo: bool,
    pub updated_at: NaiveDateTime,
}
